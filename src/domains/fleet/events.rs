use super::aggregate::{AgvId, TaskId};
use crate::common::DomainEvent;
use crate::domains::path_planning::Coord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FleetEvent {
    AgvRegistered {
        fleet_id: String,
        agv_id: AgvId,
        position: Coord,
        timestamp: DateTime<Utc>,
    },
    TaskSubmitted {
        fleet_id: String,
        task_id: TaskId,
        pickup: Coord,
        delivery: Coord,
        timestamp: DateTime<Utc>,
    },
    TaskAssigned {
        fleet_id: String,
        task_id: TaskId,
        agv_id: AgvId,
        pickup_cost: usize,
        delivery_cost: usize,
        timestamp: DateTime<Utc>,
    },
    TaskDeferred {
        fleet_id: String,
        task_id: TaskId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    AgvMoved {
        fleet_id: String,
        agv_id: AgvId,
        from: Coord,
        to: Coord,
        timestamp: DateTime<Utc>,
    },
    PickupReached {
        fleet_id: String,
        agv_id: AgvId,
        task_id: Option<TaskId>,
        at: Coord,
        timestamp: DateTime<Utc>,
    },
    TaskCompleted {
        fleet_id: String,
        task_id: TaskId,
        agv_id: AgvId,
        at: Coord,
        timestamp: DateTime<Utc>,
    },
    MotionRejected {
        fleet_id: String,
        agv_id: AgvId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for FleetEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FleetEvent::AgvRegistered { .. } => "AgvRegistered",
            FleetEvent::TaskSubmitted { .. } => "TaskSubmitted",
            FleetEvent::TaskAssigned { .. } => "TaskAssigned",
            FleetEvent::TaskDeferred { .. } => "TaskDeferred",
            FleetEvent::AgvMoved { .. } => "AgvMoved",
            FleetEvent::PickupReached { .. } => "PickupReached",
            FleetEvent::TaskCompleted { .. } => "TaskCompleted",
            FleetEvent::MotionRejected { .. } => "MotionRejected",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            FleetEvent::AgvRegistered { fleet_id, .. } => fleet_id,
            FleetEvent::TaskSubmitted { fleet_id, .. } => fleet_id,
            FleetEvent::TaskAssigned { fleet_id, .. } => fleet_id,
            FleetEvent::TaskDeferred { fleet_id, .. } => fleet_id,
            FleetEvent::AgvMoved { fleet_id, .. } => fleet_id,
            FleetEvent::PickupReached { fleet_id, .. } => fleet_id,
            FleetEvent::TaskCompleted { fleet_id, .. } => fleet_id,
            FleetEvent::MotionRejected { fleet_id, .. } => fleet_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            FleetEvent::AgvRegistered { timestamp, .. } => *timestamp,
            FleetEvent::TaskSubmitted { timestamp, .. } => *timestamp,
            FleetEvent::TaskAssigned { timestamp, .. } => *timestamp,
            FleetEvent::TaskDeferred { timestamp, .. } => *timestamp,
            FleetEvent::AgvMoved { timestamp, .. } => *timestamp,
            FleetEvent::PickupReached { timestamp, .. } => *timestamp,
            FleetEvent::TaskCompleted { timestamp, .. } => *timestamp,
            FleetEvent::MotionRejected { timestamp, .. } => *timestamp,
        }
    }
}
