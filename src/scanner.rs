// Neighborhood scanning: pick the Moore-neighborhood cell with the fewest or
// most occupants of a species, breaking ties at random

use rand::seq::SliceRandom;
use rand::Rng;

use crate::agent::{Extremum, Species};
use crate::space::{Cell, SpatialIndex};

/// Cell within `radius` of `center` holding the extreme count of `species`.
///
/// The neighborhood is shuffled before a single strict-improvement pass, so
/// among equally good cells the winner is uniformly random.
/// Returns `None` only for an empty neighborhood.
pub fn scan<S, R>(
    space: &S,
    center: Cell,
    radius: u32,
    species: Species,
    extremum: Extremum,
    rng: &mut R,
) -> Option<Cell>
where
    S: SpatialIndex + ?Sized,
    R: Rng + ?Sized,
{
    // Counts are snapshotted up front
    let mut cells: Vec<(Cell, usize)> = space
        .neighborhood_cells(center, radius)
        .into_iter()
        .map(|cell| (cell, space.occupants_at(cell, species).len()))
        .collect();
    cells.shuffle(rng);

    let mut best: Option<(Cell, usize)> = None;
    for (cell, count) in cells {
        let better = match (best, extremum) {
            (None, _) => true,
            (Some((_, best_count)), Extremum::Min) => count < best_count,
            (Some((_, best_count)), Extremum::Max) => count > best_count,
        };
        if better {
            best = Some((cell, count));
        }
    }
    best.map(|(cell, _)| cell)
}
