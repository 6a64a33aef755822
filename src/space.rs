// Spatial index: continuous positions with a synchronized discrete grid

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::agent::{AgentId, Species};
use crate::config::BorderPolicy;
use crate::error::{SimError, SimResult};

/// A discrete grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The cell containing `point` (component-wise floor).
    pub fn containing(point: Point) -> Self {
        Self {
            x: point.x.floor() as i64,
            y: point.y.floor() as i64,
        }
    }
}

/// A continuous position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Cell coordinates taken directly as continuous coordinates (the cell's
    /// lower corner, not its center).
    pub fn at_cell(cell: Cell) -> Self {
        Self {
            x: cell.x as f64,
            y: cell.y as f64,
        }
    }
}

/// Contract the engine needs from a spatial index. Every method that takes
/// an agent id fails with [`SimError::UnknownAgent`] for an unplaced agent.
pub trait SpatialIndex {
    /// Insert an agent at `point`, returning its cell.
    fn place(&mut self, id: AgentId, species: Species, point: Point) -> Cell;

    /// Release an agent's slot, returning its last position.
    fn remove(&mut self, id: AgentId) -> SimResult<Point>;

    fn current_position(&self, id: AgentId) -> SimResult<Point>;

    fn current_cell(&self, id: AgentId) -> SimResult<Cell>;

    /// Teleport an agent; the cell is re-synchronized.
    fn move_to(&mut self, id: AgentId, point: Point) -> SimResult<Cell>;

    /// Move `distance` along `angle` (radians); the cell is re-synchronized.
    fn move_by_vector(&mut self, id: AgentId, distance: f64, angle: f64) -> SimResult<Point>;

    /// Vector from `from` to `to` as this space measures it.
    fn displacement(&self, from: Point, to: Point) -> (f64, f64);

    /// Agents of `species` in `cell`, copied out so callers may mutate the index.
    fn occupants_at(&self, cell: Cell, species: Species) -> Vec<AgentId>;

    /// All cells within Chebyshev distance `radius` of `center`, center included.
    fn neighborhood_cells(&self, center: Cell, radius: u32) -> Vec<Cell>;

    /// Chebyshev distance between two cells.
    fn cell_distance(&self, a: Cell, b: Cell) -> u64;

    fn move_to_cell(&mut self, id: AgentId, cell: Cell) -> SimResult<Cell> {
        self.move_to(id, Point::at_cell(cell))
    }
}

struct Entry {
    species: Species,
    point: Point,
    cell: Cell,
}

/// Multi-occupancy grid of `width` x `height` unit cells overlaid on a
/// continuous space of the same extent.
pub struct GridSpace {
    width: usize,
    height: usize,
    border: BorderPolicy,
    entries: HashMap<AgentId, Entry>,
    // Occupants per cell in arrival order
    cells: HashMap<Cell, Vec<AgentId>>,
}

// Largest f64 strictly below a positive `v`
#[inline]
fn just_below(v: f64) -> f64 {
    f64::from_bits(v.to_bits() - 1)
}

#[inline]
fn wrap_coord(v: f64, extent: f64) -> f64 {
    let w = v.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if w >= extent {
        0.0
    } else {
        w
    }
}

#[inline]
fn shortest_delta(delta: f64, extent: f64) -> f64 {
    if delta > extent / 2.0 {
        delta - extent
    } else if delta < -extent / 2.0 {
        delta + extent
    } else {
        delta
    }
}

impl GridSpace {
    /// Panics on a zero extent; configs are validated before reaching here.
    pub fn new(width: usize, height: usize, border: BorderPolicy) -> Self {
        assert!(
            width > 0 && height > 0,
            "grid extents must be positive, got {width}x{height}"
        );
        Self {
            width,
            height,
            border,
            entries: HashMap::new(),
            cells: HashMap::new(),
        }
    }

    /// Bring a point back inside the space according to the border policy.
    pub fn normalize(&self, point: Point) -> Point {
        let (w, h) = (self.width as f64, self.height as f64);
        match self.border {
            BorderPolicy::Wrapped => Point::new(wrap_coord(point.x, w), wrap_coord(point.y, h)),
            BorderPolicy::Clipped => Point::new(
                point.x.clamp(0.0, just_below(w)),
                point.y.clamp(0.0, just_below(h)),
            ),
        }
    }

    // Distinct coordinates within `radius` of `center` along one axis
    fn axis_span(&self, center: i64, radius: u32, extent: usize) -> Vec<i64> {
        let (r, extent) = (i64::from(radius), extent as i64);
        match self.border {
            BorderPolicy::Wrapped if 2 * r + 1 >= extent => (0..extent).collect(),
            BorderPolicy::Wrapped => (center - r..=center + r)
                .map(|v| v.rem_euclid(extent))
                .collect(),
            BorderPolicy::Clipped => ((center - r).max(0)..=(center + r).min(extent - 1)).collect(),
        }
    }

    fn relocate(&mut self, id: AgentId, point: Point) -> SimResult<Cell> {
        let point = self.normalize(point);
        let new_cell = Cell::containing(point);
        let entry = self.entries.get_mut(&id).ok_or(SimError::UnknownAgent(id))?;
        let old_cell = entry.cell;
        entry.point = point;
        entry.cell = new_cell;

        if old_cell != new_cell {
            if let Some(occupants) = self.cells.get_mut(&old_cell) {
                occupants.retain(|&other| other != id);
                if occupants.is_empty() {
                    self.cells.remove(&old_cell);
                }
            }
            self.cells.entry(new_cell).or_default().push(id);
        }
        Ok(new_cell)
    }

    /// Every placed agent with its position, in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = (AgentId, Point, Cell)> + '_ {
        self.entries.iter().map(|(&id, e)| (id, e.point, e.cell))
    }
}

impl SpatialIndex for GridSpace {
    fn place(&mut self, id: AgentId, species: Species, point: Point) -> Cell {
        let point = self.normalize(point);
        let cell = Cell::containing(point);
        if let Some(previous) = self.entries.insert(id, Entry { species, point, cell }) {
            if let Some(occupants) = self.cells.get_mut(&previous.cell) {
                occupants.retain(|&other| other != id);
            }
        }
        self.cells.entry(cell).or_default().push(id);
        cell
    }

    fn remove(&mut self, id: AgentId) -> SimResult<Point> {
        let entry = self.entries.remove(&id).ok_or(SimError::UnknownAgent(id))?;
        if let Some(occupants) = self.cells.get_mut(&entry.cell) {
            occupants.retain(|&other| other != id);
            if occupants.is_empty() {
                self.cells.remove(&entry.cell);
            }
        }
        Ok(entry.point)
    }

    fn current_position(&self, id: AgentId) -> SimResult<Point> {
        self.entries
            .get(&id)
            .map(|e| e.point)
            .ok_or(SimError::UnknownAgent(id))
    }

    fn current_cell(&self, id: AgentId) -> SimResult<Cell> {
        self.entries
            .get(&id)
            .map(|e| e.cell)
            .ok_or(SimError::UnknownAgent(id))
    }

    fn move_to(&mut self, id: AgentId, point: Point) -> SimResult<Cell> {
        self.relocate(id, point)
    }

    fn move_by_vector(&mut self, id: AgentId, distance: f64, angle: f64) -> SimResult<Point> {
        let from = self.current_position(id)?;
        let target = Point::new(
            from.x + distance * angle.cos(),
            from.y + distance * angle.sin(),
        );
        self.relocate(id, target)?;
        self.current_position(id)
    }

    fn displacement(&self, from: Point, to: Point) -> (f64, f64) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        match self.border {
            BorderPolicy::Wrapped => (
                shortest_delta(dx, self.width as f64),
                shortest_delta(dy, self.height as f64),
            ),
            BorderPolicy::Clipped => (dx, dy),
        }
    }

    fn occupants_at(&self, cell: Cell, species: Species) -> Vec<AgentId> {
        self.cells
            .get(&cell)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| {
                        self.entries
                            .get(id)
                            .map_or(false, |e| e.species == species)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn neighborhood_cells(&self, center: Cell, radius: u32) -> Vec<Cell> {
        let xs = self.axis_span(center.x, radius, self.width);
        let ys = self.axis_span(center.y, radius, self.height);
        let mut cells = Vec::with_capacity(xs.len() * ys.len());
        for &x in &xs {
            for &y in &ys {
                cells.push(Cell::new(x, y));
            }
        }
        cells
    }

    fn cell_distance(&self, a: Cell, b: Cell) -> u64 {
        let (dx, dy) = ((a.x - b.x).unsigned_abs(), (a.y - b.y).unsigned_abs());
        match self.border {
            BorderPolicy::Wrapped => {
                let (w, h) = (self.width as u64, self.height as u64);
                let dx = dx % w;
                let dy = dy % h;
                dx.min(w - dx).max(dy.min(h - dy))
            }
            BorderPolicy::Clipped => dx.max(dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cell_is_floor_of_position() {
        assert_eq!(Cell::containing(Point::new(2.99, 0.0)), Cell::new(2, 0));
        assert_eq!(Cell::containing(Point::new(-0.1, 3.5)), Cell::new(-1, 3));
        assert_eq!(Point::at_cell(Cell::new(4, 7)), Point::new(4.0, 7.0));
    }

    #[test]
    fn wrapped_moves_reenter_from_the_opposite_edge() {
        let mut space = GridSpace::new(10, 10, BorderPolicy::Wrapped);
        let id = AgentId(1);
        space.place(id, Species::Zombie, Point::new(0.5, 9.5));
        let p = space
            .move_by_vector(id, 1.0, std::f64::consts::PI)
            .unwrap();
        assert!((p.x - 9.5).abs() < 1e-9);
        assert_eq!(space.current_cell(id).unwrap(), Cell::new(9, 9));

        let p = space
            .move_by_vector(id, 1.0, std::f64::consts::FRAC_PI_2)
            .unwrap();
        assert!((p.y - 0.5).abs() < 1e-9);
        assert_eq!(space.current_cell(id).unwrap(), Cell::new(9, 0));
    }

    #[test]
    fn clipped_moves_stop_inside_the_grid() {
        let mut space = GridSpace::new(5, 5, BorderPolicy::Clipped);
        let id = AgentId(1);
        space.place(id, Species::Human, Point::new(4.5, 0.5));
        space.move_by_vector(id, 3.0, 0.0).unwrap();
        assert_eq!(space.current_cell(id).unwrap(), Cell::new(4, 0));
        space.move_by_vector(id, 3.0, -std::f64::consts::FRAC_PI_2).unwrap();
        assert_eq!(space.current_cell(id).unwrap(), Cell::new(4, 0));
        let p = space.current_position(id).unwrap();
        assert!(p.x < 5.0 && p.y >= 0.0);
    }

    #[test]
    fn occupancy_follows_moves_and_filters_species() {
        let mut space = GridSpace::new(10, 10, BorderPolicy::Wrapped);
        space.place(AgentId(1), Species::Human, Point::new(3.2, 3.2));
        space.place(AgentId(2), Species::Zombie, Point::new(3.8, 3.1));
        space.place(AgentId(3), Species::Human, Point::new(3.5, 3.9));

        let cell = Cell::new(3, 3);
        assert_eq!(space.occupants_at(cell, Species::Human), vec![AgentId(1), AgentId(3)]);
        assert_eq!(space.occupants_at(cell, Species::Zombie), vec![AgentId(2)]);

        space.move_to_cell(AgentId(1), Cell::new(6, 6)).unwrap();
        assert_eq!(space.occupants_at(cell, Species::Human), vec![AgentId(3)]);
        assert_eq!(
            space.occupants_at(Cell::new(6, 6), Species::Human),
            vec![AgentId(1)]
        );

        assert_eq!(space.remove(AgentId(3)).unwrap(), Point::new(3.5, 3.9));
        assert!(space.occupants_at(cell, Species::Human).is_empty());
        assert!(matches!(
            space.current_cell(AgentId(3)),
            Err(SimError::UnknownAgent(AgentId(3)))
        ));
    }

    #[test]
    fn neighborhoods_respect_the_border_policy() {
        let wrapped = GridSpace::new(10, 10, BorderPolicy::Wrapped);
        let cells = wrapped.neighborhood_cells(Cell::new(0, 0), 1);
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&Cell::new(9, 9)));
        assert!(cells.contains(&Cell::new(0, 0)));

        let clipped = GridSpace::new(10, 10, BorderPolicy::Clipped);
        let cells = clipped.neighborhood_cells(Cell::new(0, 0), 1);
        assert_eq!(cells.len(), 4);
        assert!(!cells.contains(&Cell::new(9, 9)));

        let tiny = GridSpace::new(2, 2, BorderPolicy::Wrapped);
        assert_eq!(tiny.neighborhood_cells(Cell::new(0, 0), 1).len(), 4);
        assert_eq!(clipped.neighborhood_cells(Cell::new(5, 5), 0), vec![Cell::new(5, 5)]);
    }

    #[test]
    fn huge_radii_cover_the_grid_once() {
        for border in [BorderPolicy::Wrapped, BorderPolicy::Clipped] {
            let space = GridSpace::new(50, 40, border);
            let cells = space.neighborhood_cells(Cell::new(3, 7), u32::MAX);
            let distinct: HashSet<_> = cells.iter().collect();
            assert_eq!(cells.len(), 50 * 40);
            assert_eq!(distinct.len(), cells.len());
        }

        // On a torus, a neighborhood as wide as the grid covers it exactly once
        let torus = GridSpace::new(7, 7, BorderPolicy::Wrapped);
        let cells = torus.neighborhood_cells(Cell::new(0, 0), 3);
        let distinct: HashSet<_> = cells.iter().collect();
        assert_eq!(cells.len(), 49);
        assert_eq!(distinct.len(), 49);
        assert_eq!(torus.neighborhood_cells(Cell::new(0, 0), 2).len(), 25);
    }

    #[test]
    #[should_panic(expected = "grid extents must be positive")]
    fn zero_extent_grids_are_refused() {
        GridSpace::new(0, 10, BorderPolicy::Wrapped);
    }

    #[test]
    fn wrapped_distances_take_the_short_way_round() {
        let wrapped = GridSpace::new(10, 10, BorderPolicy::Wrapped);
        assert_eq!(wrapped.cell_distance(Cell::new(0, 0), Cell::new(9, 9)), 1);
        assert_eq!(wrapped.cell_distance(Cell::new(2, 2), Cell::new(4, 3)), 2);
        let (dx, dy) = wrapped.displacement(Point::new(0.5, 5.0), Point::new(9.0, 5.0));
        assert!((dx + 1.5).abs() < 1e-9);
        assert_eq!(dy, 0.0);

        let clipped = GridSpace::new(10, 10, BorderPolicy::Clipped);
        assert_eq!(clipped.cell_distance(Cell::new(0, 0), Cell::new(9, 9)), 9);
        let (dx, _) = clipped.displacement(Point::new(0.5, 5.0), Point::new(9.0, 5.0));
        assert!((dx - 8.5).abs() < 1e-9);
    }
}
