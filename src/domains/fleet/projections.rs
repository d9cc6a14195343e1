use super::aggregate::{Agv, AgvId, AgvStatus, Task, TaskId, TaskStatus};
use super::events::FleetEvent;
use crate::common::DomainEvent;
use crate::domains::path_planning::Coord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-AGV view pushed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgvView {
    pub id: AgvId,
    pub position: Coord,
    pub status: AgvStatus,
    pub path: Vec<Coord>,
    pub path_history: Vec<Coord>,
}

impl From<&Agv> for AgvView {
    fn from(agv: &Agv) -> Self {
        Self {
            id: agv.id,
            position: agv.position(),
            status: agv.status(),
            path: agv.current_path().iter().copied().collect(),
            path_history: agv.path_history().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub pickup: Coord,
    pub delivery: Coord,
    pub status: TaskStatus,
    pub assigned_agv: Option<AgvId>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            pickup: task.pickup,
            delivery: task.delivery,
            status: task.status(),
            assigned_agv: task.assigned_agv(),
        }
    }
}

/// Whole-fleet state as broadcast after a state-changing tick or assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub agvs: Vec<AgvView>,
    pub tasks: Vec<TaskView>,
}

impl FleetSnapshot {
    pub fn capture(agvs: &[Agv], tasks: &[Task]) -> Self {
        Self {
            agvs: agvs.iter().map(AgvView::from).collect(),
            tasks: tasks.iter().map(TaskView::from).collect(),
        }
    }
}

/// Running counters folded from fleet events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetStatistics {
    pub agv_count: usize,
    pub tasks_submitted: usize,
    pub tasks_assigned: usize,
    pub tasks_deferred: usize,
    pub tasks_completed: usize,
    pub cells_travelled: usize,
    pub rejected_steps: usize,
    pub deliveries_per_agv: BTreeMap<AgvId, usize>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl FleetStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &FleetEvent) {
        match event {
            FleetEvent::AgvRegistered { .. } => self.agv_count += 1,
            FleetEvent::TaskSubmitted { .. } => self.tasks_submitted += 1,
            FleetEvent::TaskAssigned { .. } => self.tasks_assigned += 1,
            FleetEvent::TaskDeferred { .. } => self.tasks_deferred += 1,
            FleetEvent::AgvMoved { .. } => self.cells_travelled += 1,
            FleetEvent::TaskCompleted { agv_id, .. } => {
                self.tasks_completed += 1;
                *self.deliveries_per_agv.entry(*agv_id).or_insert(0) += 1;
            }
            FleetEvent::MotionRejected { .. } => self.rejected_steps += 1,
            FleetEvent::PickupReached { .. } => {}
        }
        self.last_activity = Some(event.occurred_at());
    }

    pub fn tasks_in_flight(&self) -> usize {
        self.tasks_assigned.saturating_sub(self.tasks_completed)
    }
}
