use super::grid::{adjacent_cells, Coord, GridMap};
use super::validity::{effective_validity, Traversable};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::ops::Add;
use std::sync::Arc;

/// Edge count of a planned path, or the explicit unreachable marker.
///
/// `Unreachable` orders above every finite cost, so `min` comparisons never
/// pick it over a real path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathCost {
    Steps(usize),
    Unreachable,
}

impl PathCost {
    pub fn steps(&self) -> Option<usize> {
        match self {
            PathCost::Steps(n) => Some(*n),
            PathCost::Unreachable => None,
        }
    }
}

impl Add for PathCost {
    type Output = PathCost;

    fn add(self, rhs: PathCost) -> PathCost {
        match (self, rhs) {
            (PathCost::Steps(a), PathCost::Steps(b)) => PathCost::Steps(a + b),
            _ => PathCost::Unreachable,
        }
    }
}

impl fmt::Display for PathCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCost::Steps(n) => write!(f, "{}", n),
            PathCost::Unreachable => write!(f, "unreachable"),
        }
    }
}

pub fn path_cost(path: &[Coord]) -> PathCost {
    if path.is_empty() {
        PathCost::Unreachable
    } else {
        PathCost::Steps(path.len() - 1)
    }
}

/// 4-connected A* over the warehouse grid.
///
/// Heap entries carry an insertion sequence number after `f`, so among
/// entries with equal `f` the one pushed first is expanded first.
#[derive(Debug, Clone)]
pub struct PathFinder {
    map: Arc<GridMap>,
}

impl PathFinder {
    pub fn new(map: Arc<GridMap>) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn heuristic(a: Coord, b: Coord) -> u32 {
        a.manhattan(&b)
    }

    pub fn find_path(&self, start: Coord, goal: Coord) -> Vec<Coord> {
        search(self.map.as_ref(), start, goal)
    }

    /// Plan around the current positions of other agents.
    ///
    /// The obstacle set is a snapshot: nothing is reserved over time, so two
    /// plans made in the same tick may still cross.
    pub fn find_path_avoiding_agents(
        &self,
        start: Coord,
        goal: Coord,
        other_agents: &HashSet<Coord>,
    ) -> Vec<Coord> {
        let exempt = [start, goal];
        let view = effective_validity(&self.map, other_agents, &exempt);
        search(&view, start, goal)
    }

    pub fn path_cost(&self, path: &[Coord]) -> PathCost {
        path_cost(path)
    }
}

pub fn search<T: Traversable + ?Sized>(view: &T, start: Coord, goal: Coord) -> Vec<Coord> {
    if !view.is_traversable(start) || !view.is_traversable(goal) {
        return Vec::new();
    }

    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;
    frontier.push(Reverse((PathFinder::heuristic(start, goal), sequence, 0u32, start)));

    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut cost_so_far: HashMap<Coord, u32> = HashMap::new();
    cost_so_far.insert(start, 0);

    let mut found = false;
    while let Some(Reverse((_, _, g, current))) = frontier.pop() {
        if current == goal {
            found = true;
            break;
        }
        if cost_so_far.get(&current).is_some_and(|best| g > *best) {
            continue;
        }

        for next in adjacent_cells(current).filter(|c| view.is_traversable(*c)) {
            let new_cost = g + 1;
            let improved = cost_so_far.get(&next).map_or(true, |old| new_cost < *old);
            if improved {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, current);
                sequence += 1;
                let priority = new_cost + PathFinder::heuristic(next, goal);
                frontier.push(Reverse((priority, sequence, new_cost, next)));
            }
        }
    }

    if !found {
        return Vec::new();
    }

    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current) {
        path.push(*prev);
        current = *prev;
    }
    path.reverse();
    path
}
