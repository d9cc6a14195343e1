use super::Scheduler;
use crate::common::DomainError;
use crate::domains::fleet::aggregate::agv::AgvId;
use crate::domains::fleet::aggregate::task::Task;
use crate::domains::fleet::events::FleetEvent;
use crate::domains::path_planning::{path_cost, Coord, PathCost};
use chrono::Utc;
use std::collections::HashSet;

/// Both legs of a task as planned from one starting cell.
struct Legs {
    to_pickup: Vec<Coord>,
    to_delivery: Vec<Coord>,
}

impl Legs {
    fn cost(&self) -> PathCost {
        path_cost(&self.to_pickup) + path_cost(&self.to_delivery)
    }
}

impl Scheduler {
    fn plan_legs(&self, from: Coord, task: &Task, occupied: &HashSet<Coord>) -> Option<Legs> {
        let to_pickup = self
            .path_finder
            .find_path_avoiding_agents(from, task.pickup, occupied);
        if to_pickup.is_empty() {
            return None;
        }
        // Scored from the pickup cell, so this leg is the same for every candidate.
        let to_delivery = self
            .path_finder
            .find_path_avoiding_agents(task.pickup, task.delivery, occupied);
        if to_delivery.is_empty() {
            return None;
        }
        Some(Legs { to_pickup, to_delivery })
    }

    /// Cheapest idle AGV for `task`; the earliest in the roster wins ties.
    pub fn select_best_agv(&self, task: &Task) -> Option<AgvId> {
        let occupied = self.occupied_positions();
        let mut best: Option<(AgvId, PathCost)> = None;

        for agv in self.agvs.iter().filter(|a| a.is_idle()) {
            let Some(legs) = self.plan_legs(agv.position(), task, &occupied) else {
                continue;
            };
            let total = legs.cost();
            if best.map_or(true, |(_, cost)| total < cost) {
                best = Some((agv.id, total));
            }
        }

        best.map(|(id, _)| id)
    }

    /// Record `task` and try to commit it to the cheapest idle AGV.
    ///
    /// Returns false when no idle AGV can reach both legs; the task then stays
    /// pending in the ledger. A task id already in the ledger is refused.
    pub fn assign_task(&mut self, task: Task) -> bool {
        if self.tasks.iter().any(|t| t.id == task.id) {
            self.logger
                .warn(&format!("Task {} was already submitted; ignoring duplicate", task.id));
            return false;
        }

        self.add_event(FleetEvent::TaskSubmitted {
            fleet_id: self.id.clone(),
            task_id: task.id,
            pickup: task.pickup,
            delivery: task.delivery,
            timestamp: Utc::now(),
        });
        self.tasks.push(task);
        self.try_assign(self.tasks.len() - 1)
    }

    /// Re-attempt every pending task in submission order.
    pub fn retry_pending(&mut self) -> usize {
        let pending: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_pending())
            .map(|(i, _)| i)
            .collect();

        pending.into_iter().filter(|i| self.try_assign(*i)).count()
    }

    fn try_assign(&mut self, index: usize) -> bool {
        let task = self.tasks[index].clone();
        if !task.is_pending() {
            return false;
        }

        let Some(agv_id) = self.select_best_agv(&task) else {
            self.defer(&task, "no idle AGV can reach both legs");
            return false;
        };
        let Some(agv_index) = self.agvs.iter().position(|a| a.id == agv_id) else {
            let e = DomainError::AgvNotFound { id: agv_id };
            self.logger.error(&format!("Task {}: {}", task.id, e));
            self.defer(&task, "selected AGV vanished from the roster");
            return false;
        };

        // Legs are re-planned here rather than reused from selection.
        let occupied = self.occupied_positions();
        let start = self.agvs[agv_index].position();
        let Some(legs) = self.plan_legs(start, &task, &occupied) else {
            self.defer(&task, "route became infeasible after selection");
            return false;
        };

        let pickup_cost = legs.to_pickup.len() - 1;
        let delivery_cost = legs.to_delivery.len() - 1;
        let route: Vec<Coord> = legs
            .to_pickup
            .into_iter()
            .skip(1)
            .chain(legs.to_delivery.into_iter().skip(1))
            .collect();

        if let Err(e) = self.agvs[agv_index].set_path(route, vec![task.pickup, task.delivery], Some(task.id)) {
            self.logger
                .error(&format!("AGV {} refused route for task {}: {}", agv_id, task.id, e));
            self.defer(&task, "route rejected by AGV");
            return false;
        }
        if let Err(e) = self.tasks[index].start(agv_id) {
            self.logger.error(&format!("Task {} could not start: {}", task.id, e));
        }

        self.logger.info(&format!(
            "Task {} assigned to AGV {} (pickup {} steps, delivery {} steps)",
            task.id, agv_id, pickup_cost, delivery_cost
        ));
        self.add_event(FleetEvent::TaskAssigned {
            fleet_id: self.id.clone(),
            task_id: task.id,
            agv_id,
            pickup_cost,
            delivery_cost,
            timestamp: Utc::now(),
        });
        true
    }

    fn defer(&mut self, task: &Task, reason: &str) {
        self.logger
            .warn(&format!("Task {} left pending: {}", task.id, reason));
        self.add_event(FleetEvent::TaskDeferred {
            fleet_id: self.id.clone(),
            task_id: task.id,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }
}
