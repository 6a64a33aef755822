// Single fixed-length steps toward a target cell

use crate::agent::AgentId;
use crate::space::{Cell, Point, SpatialIndex};

/// Step `id` by `step_length` toward `target`.
///
/// Heads for the point whose coordinates are the target cell's integer
/// coordinates, using the space's own displacement (shortest way round on a
/// wrapped grid). Returns `Ok(false)` without touching the index when the
/// agent already occupies `target`.
pub fn move_toward<S>(space: &mut S, id: AgentId, target: Cell, step_length: f64) -> crate::SimResult<bool>
where
    S: SpatialIndex + ?Sized,
{
    if space.current_cell(id)? == target {
        return Ok(false);
    }

    let from = space.current_position(id)?;
    let (dx, dy) = space.displacement(from, Point::at_cell(target));
    let angle = dy.atan2(dx);
    let to = space.move_by_vector(id, step_length, angle)?;

    tracing::trace!(
        agent = %id,
        from_x = from.x,
        from_y = from.y,
        to_x = to.x,
        to_y = to.y,
        "moved"
    );
    Ok(true)
}
