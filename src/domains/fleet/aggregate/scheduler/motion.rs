use super::Scheduler;
use crate::common::DomainError;
use crate::domains::fleet::aggregate::agv::StepOutcome;
use crate::domains::fleet::events::FleetEvent;
use chrono::Utc;

impl Scheduler {
    /// Advance every AGV with a pending path by one cell.
    ///
    /// Returns true when at least one AGV moved.
    pub fn tick(&mut self) -> bool {
        let mut moved = false;
        let mut events = Vec::new();
        let mut completed = Vec::new();

        for agv in self.agvs.iter_mut().filter(|a| a.has_pending_path()) {
            let from = agv.position();
            match agv.move_next() {
                Ok(outcome) => {
                    moved = true;
                    events.push(FleetEvent::AgvMoved {
                        fleet_id: self.id.clone(),
                        agv_id: agv.id,
                        from,
                        to: agv.position(),
                        timestamp: Utc::now(),
                    });
                    match outcome {
                        StepOutcome::Moved { .. } => {}
                        StepOutcome::ReachedPickup { at } => {
                            events.push(FleetEvent::PickupReached {
                                fleet_id: self.id.clone(),
                                agv_id: agv.id,
                                task_id: agv.task_id(),
                                at,
                                timestamp: Utc::now(),
                            });
                        }
                        StepOutcome::Completed { at, task_id } => {
                            completed.push((agv.id, task_id, at));
                        }
                    }
                }
                Err(e) => {
                    self.logger
                        .warn(&format!("AGV {} step rejected: {}", agv.id, e));
                    events.push(FleetEvent::MotionRejected {
                        fleet_id: self.id.clone(),
                        agv_id: agv.id,
                        reason: e.to_string(),
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        for (agv_id, task_id, at) in completed {
            let Some(task_id) = task_id else { continue };
            let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
                let e = DomainError::TaskNotFound { id: task_id };
                self.logger
                    .error(&format!("AGV {} finished a task outside the ledger: {}", agv_id, e));
                continue;
            };
            if let Err(e) = task.complete() {
                self.logger.error(&format!("Task {}: {}", task_id, e));
                continue;
            }
            self.logger
                .info(&format!("Task {} delivered by AGV {} at {}", task_id, agv_id, at));
            events.push(FleetEvent::TaskCompleted {
                fleet_id: self.id.clone(),
                task_id,
                agv_id,
                at,
                timestamp: Utc::now(),
            });
        }

        for event in events {
            self.add_event(event);
        }
        moved
    }
}
