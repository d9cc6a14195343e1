use super::aggregate::{Task, TaskId};
use crate::common::{DomainError, DomainResult};
use crate::domains::path_planning::{Coord, GridMap};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// Hands out task ids and random pickup/delivery pairs on free cells.
pub struct TaskGenerator {
    map: Arc<GridMap>,
    next_id: TaskId,
    rng: StdRng,
}

impl TaskGenerator {
    pub fn new(map: Arc<GridMap>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { map, next_id: 0, rng }
    }

    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    pub fn generate(&mut self) -> DomainResult<Task> {
        let free = self.map.valid_positions();
        let picks: Vec<Coord> = free.choose_multiple(&mut self.rng, 2).copied().collect();
        let &[pickup, delivery] = picks.as_slice() else {
            return Err(DomainError::InvalidMap {
                reason: "At least two free cells are needed to generate a task".to_string(),
            });
        };
        self.issue(pickup, delivery)
    }

    /// Build a task for explicit endpoints, validating both against the map.
    pub fn task_at(&mut self, pickup: Coord, delivery: Coord) -> DomainResult<Task> {
        for (label, c) in [("pickup", pickup), ("delivery", delivery)] {
            if !self.map.is_valid(c) {
                return Err(DomainError::InvalidTask {
                    reason: format!("{} {} is not a free cell", label, c),
                });
            }
        }
        self.issue(pickup, delivery)
    }

    fn issue(&mut self, pickup: Coord, delivery: Coord) -> DomainResult<Task> {
        let task = Task::new(self.next_id, pickup, delivery)?;
        self.next_id += 1;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tasks_use_distinct_free_cells() {
        let map = Arc::new(GridMap::warehouse());
        let mut generator = TaskGenerator::new(map.clone(), Some(42));
        for expected_id in 0..50 {
            let task = generator.generate().unwrap();
            assert_eq!(task.id, expected_id);
            assert_ne!(task.pickup, task.delivery);
            assert!(map.is_valid(task.pickup));
            assert!(map.is_valid(task.delivery));
        }
    }

    #[test]
    fn explicit_endpoints_are_validated() {
        let map = Arc::new(GridMap::warehouse());
        let mut generator = TaskGenerator::new(map, Some(1));
        assert!(generator.task_at(Coord::new(4, 2), Coord::new(0, 0)).is_err());
        assert!(generator.task_at(Coord::new(0, 0), Coord::new(0, 0)).is_err());
        assert_eq!(generator.next_id(), 0);
        let task = generator.task_at(Coord::new(0, 0), Coord::new(8, 8)).unwrap();
        assert_eq!(task.id, 0);
        assert_eq!(generator.next_id(), 1);
    }

    #[test]
    fn single_cell_map_cannot_generate() {
        let map = Arc::new(GridMap::open(1).unwrap());
        let mut generator = TaskGenerator::new(map, Some(0));
        assert!(generator.generate().is_err());
    }
}
