use super::grid::{Coord, GridMap};
use std::collections::HashSet;

/// Anything the search can ask "may I stand here?".
pub trait Traversable {
    fn is_traversable(&self, c: Coord) -> bool;
}

impl Traversable for GridMap {
    fn is_traversable(&self, c: Coord) -> bool {
        self.is_valid(c)
    }
}

impl<F> Traversable for F
where
    F: Fn(Coord) -> bool,
{
    fn is_traversable(&self, c: Coord) -> bool {
        self(c)
    }
}

/// Compose the static map with cells temporarily held by other agents.
///
/// Occupied cells are added to the map's blocked set, so boundary points keep
/// overriding them. Cells in `exempt` (the planner's own start and goal) are
/// never treated as occupied.
pub fn effective_validity<'a>(
    base: &'a GridMap,
    extra_blocked: &'a HashSet<Coord>,
    exempt: &'a [Coord],
) -> impl Fn(Coord) -> bool + 'a {
    move |c| {
        base.in_bounds(c)
            && (base.is_boundary(c)
                || exempt.contains(&c)
                || (base.is_valid(c) && !extra_blocked.contains(&c)))
    }
}
