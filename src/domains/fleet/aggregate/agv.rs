use super::task::TaskId;
use crate::common::{DomainError, DomainResult, MotionError};
use crate::domains::path_planning::Coord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub type AgvId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgvStatus {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "to_pickup")]
    MovingToPickup,
    #[serde(rename = "to_delivery")]
    MovingToDelivery,
}

/// What a single successful step led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { to: Coord },
    ReachedPickup { at: Coord },
    Completed { at: Coord, task_id: Option<TaskId> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agv {
    pub id: AgvId,
    position: Coord,
    status: AgvStatus,
    current_path: VecDeque<Coord>,
    target_position: Option<Coord>,
    // Leg targets still ahead once `target_position` is reached.
    pending_targets: VecDeque<Coord>,
    task_id: Option<TaskId>,
    path_history: Vec<Coord>,
}

impl Agv {
    pub fn new(id: AgvId, position: Coord) -> Self {
        Self {
            id,
            position,
            status: AgvStatus::Idle,
            current_path: VecDeque::new(),
            target_position: None,
            pending_targets: VecDeque::new(),
            task_id: None,
            path_history: Vec::new(),
        }
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn status(&self) -> AgvStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == AgvStatus::Idle
    }

    pub fn current_path(&self) -> &VecDeque<Coord> {
        &self.current_path
    }

    pub fn has_pending_path(&self) -> bool {
        !self.current_path.is_empty()
    }

    pub fn target_position(&self) -> Option<Coord> {
        self.target_position
    }

    pub fn pending_targets(&self) -> &VecDeque<Coord> {
        &self.pending_targets
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    pub fn path_history(&self) -> &[Coord] {
        &self.path_history
    }

    /// Commit a route and its leg targets (pickup first, delivery last).
    ///
    /// `path` excludes the current position and must end on the last target.
    /// Nothing is mutated when the route is rejected.
    pub fn set_path(
        &mut self,
        path: Vec<Coord>,
        targets: Vec<Coord>,
        task_id: Option<TaskId>,
    ) -> DomainResult<()> {
        if !self.is_idle() {
            return Err(DomainError::InvalidCommand {
                reason: format!("AGV {} is busy ({:?})", self.id, self.status),
            });
        }
        let Some(final_target) = targets.last().copied() else {
            return Err(DomainError::InvalidCommand {
                reason: format!("AGV {} was given a route without targets", self.id),
            });
        };

        let mut from = self.position;
        for step in &path {
            if !from.is_adjacent(step) {
                return Err(MotionError::NonAdjacentStep { from, to: *step }.into());
            }
            from = *step;
        }
        if from != final_target {
            return Err(DomainError::InvalidCommand {
                reason: format!(
                    "AGV {} route ends at {} but the final target is {}",
                    self.id, from, final_target
                ),
            });
        }

        let mut targets: VecDeque<Coord> = targets.into();
        self.target_position = targets.pop_front();
        self.pending_targets = targets;
        self.current_path = path.into();
        self.task_id = task_id;
        self.status = AgvStatus::MovingToPickup;
        self.path_history = vec![self.position];

        // Legs that end where the AGV already stands are done on arrival.
        while self.check_arrival().is_some() && !self.is_idle() {}
        Ok(())
    }

    pub fn move_next(&mut self) -> Result<StepOutcome, MotionError> {
        let next = *self.current_path.front().ok_or(MotionError::PathExhausted)?;
        if !self.position.is_adjacent(&next) {
            return Err(MotionError::NonAdjacentStep {
                from: self.position,
                to: next,
            });
        }

        self.current_path.pop_front();
        self.position = next;
        self.path_history.push(next);

        Ok(self.check_arrival().unwrap_or(StepOutcome::Moved { to: next }))
    }

    fn check_arrival(&mut self) -> Option<StepOutcome> {
        if self.target_position != Some(self.position) {
            return None;
        }
        let at = self.position;
        match self.status {
            AgvStatus::MovingToPickup if !self.pending_targets.is_empty() => {
                self.status = AgvStatus::MovingToDelivery;
                self.target_position = self.pending_targets.pop_front();
                Some(StepOutcome::ReachedPickup { at })
            }
            AgvStatus::MovingToPickup | AgvStatus::MovingToDelivery
                if self.current_path.is_empty() =>
            {
                Some(self.finish(at))
            }
            _ => None,
        }
    }

    fn finish(&mut self, at: Coord) -> StepOutcome {
        self.status = AgvStatus::Idle;
        self.target_position = None;
        self.pending_targets.clear();
        StepOutcome::Completed {
            at,
            task_id: self.task_id.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn assert_idle_invariant(agv: &Agv) {
        assert_eq!(
            agv.is_idle(),
            agv.current_path().is_empty() && agv.target_position().is_none()
        );
    }

    #[test]
    fn move_next_on_empty_path_mutates_nothing() {
        let mut agv = Agv::new(0, c(1, 1));
        assert_eq!(agv.move_next(), Err(MotionError::PathExhausted));
        assert_eq!(agv.position(), c(1, 1));
        assert!(agv.path_history().is_empty());
        assert_eq!(agv.status(), AgvStatus::Idle);
    }

    #[test]
    fn full_task_cycle() {
        let mut agv = Agv::new(0, c(0, 0));
        agv.set_path(vec![c(0, 1), c(1, 1), c(2, 1)], vec![c(0, 1), c(2, 1)], Some(7))
            .unwrap();
        assert_eq!(agv.status(), AgvStatus::MovingToPickup);
        assert_eq!(agv.path_history(), &[c(0, 0)]);

        assert_eq!(agv.move_next(), Ok(StepOutcome::ReachedPickup { at: c(0, 1) }));
        assert_eq!(agv.status(), AgvStatus::MovingToDelivery);
        assert_eq!(agv.target_position(), Some(c(2, 1)));

        assert_eq!(agv.move_next(), Ok(StepOutcome::Moved { to: c(1, 1) }));
        assert_idle_invariant(&agv);

        assert_eq!(
            agv.move_next(),
            Ok(StepOutcome::Completed { at: c(2, 1), task_id: Some(7) })
        );
        assert_eq!(agv.status(), AgvStatus::Idle);
        assert_eq!(agv.task_id(), None);
        assert_eq!(agv.path_history(), &[c(0, 0), c(0, 1), c(1, 1), c(2, 1)]);
        assert_idle_invariant(&agv);
    }

    #[test]
    fn non_adjacent_route_is_rejected_without_mutation() {
        let mut agv = Agv::new(3, c(0, 0));
        let err = agv
            .set_path(vec![c(0, 1), c(2, 1)], vec![c(2, 1)], None)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Motion(MotionError::NonAdjacentStep { .. })
        ));
        assert!(agv.is_idle());
        assert!(agv.current_path().is_empty());
    }

    #[test]
    fn route_must_end_on_final_target() {
        let mut agv = Agv::new(0, c(0, 0));
        assert!(agv.set_path(vec![c(0, 1)], vec![c(0, 2)], None).is_err());
        assert!(agv.set_path(vec![c(0, 1)], Vec::new(), None).is_err());
        assert!(agv.is_idle());
    }

    #[test]
    fn busy_agv_rejects_new_route() {
        let mut agv = Agv::new(0, c(0, 0));
        agv.set_path(vec![c(1, 0)], vec![c(1, 0)], None).unwrap();
        assert!(agv.set_path(vec![c(0, 1)], vec![c(0, 1)], None).is_err());
        assert_eq!(agv.target_position(), Some(c(1, 0)));
    }

    #[test]
    fn pickup_at_current_position_starts_on_delivery_leg() {
        let mut agv = Agv::new(0, c(2, 2));
        agv.set_path(vec![c(2, 3)], vec![c(2, 2), c(2, 3)], Some(1)).unwrap();
        assert_eq!(agv.status(), AgvStatus::MovingToDelivery);
        assert_eq!(agv.target_position(), Some(c(2, 3)));
        assert!(matches!(agv.move_next(), Ok(StepOutcome::Completed { .. })));
        assert!(agv.is_idle());
    }
}
