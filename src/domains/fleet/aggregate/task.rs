use super::agv::AgvId;
use crate::common::{DomainError, DomainResult};
use crate::domains::path_planning::Coord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// A pickup/delivery job. Status only moves forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub pickup: Coord,
    pub delivery: Coord,
    status: TaskStatus,
    assigned_agv: Option<AgvId>,
    pub created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, pickup: Coord, delivery: Coord) -> DomainResult<Self> {
        if pickup == delivery {
            return Err(DomainError::InvalidTask {
                reason: format!("Task {} picks up and delivers at the same cell {}", id, pickup),
            });
        }
        Ok(Self {
            id,
            pickup,
            delivery,
            status: TaskStatus::Pending,
            assigned_agv: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        })
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn assigned_agv(&self) -> Option<AgvId> {
        self.assigned_agv
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn start(&mut self, agv_id: AgvId) -> DomainResult<()> {
        if self.status != TaskStatus::Pending {
            return Err(DomainError::InvalidCommand {
                reason: format!("Task {} cannot start from {:?}", self.id, self.status),
            });
        }
        self.assigned_agv = Some(agv_id);
        self.status = TaskStatus::InProgress;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn complete(&mut self) -> DomainResult<()> {
        if self.status != TaskStatus::InProgress {
            return Err(DomainError::InvalidCommand {
                reason: format!("Task {} cannot complete from {:?}", self.id, self.status),
            });
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_is_monotonic() {
        let mut task = Task::new(1, Coord::new(0, 0), Coord::new(1, 1)).unwrap();
        assert!(task.complete().is_err());

        task.start(4).unwrap();
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.assigned_agv(), Some(4));
        assert!(task.start(5).is_err());
        assert_eq!(task.assigned_agv(), Some(4));

        task.complete().unwrap();
        assert_eq!(task.status(), TaskStatus::Completed);
        assert!(task.completed_at().is_some());
        assert!(task.complete().is_err());
    }

    #[test]
    fn identical_endpoints_are_rejected() {
        assert!(Task::new(1, Coord::new(2, 2), Coord::new(2, 2)).is_err());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
