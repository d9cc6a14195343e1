use crate::common::{DomainError, DomainResult};
use crate::domains::fleet::aggregate::agv::{Agv, AgvId};
use crate::domains::fleet::aggregate::task::{Task, TaskId};
use crate::domains::fleet::events::FleetEvent;
use crate::domains::fleet::projections::FleetSnapshot;
use crate::domains::logger::DynLogger;
use crate::domains::path_planning::{Coord, GridMap, PathFinder};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Owns the AGV roster and the task ledger. All mutation of either goes
/// through here, so callers must serialize access to one scheduler.
pub struct Scheduler {
    pub id: String,
    pub(super) path_finder: PathFinder,
    pub(super) agvs: Vec<Agv>,
    pub(super) tasks: Vec<Task>,
    pub(super) logger: DynLogger,
    uncommitted_events: Vec<FleetEvent>,
}

impl Scheduler {
    pub fn uncommitted_events(&self) -> &[FleetEvent] {
        &self.uncommitted_events
    }
    pub fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }
    pub fn take_uncommitted_events(&mut self) -> Vec<FleetEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
    pub(super) fn add_event(&mut self, event: FleetEvent) {
        self.uncommitted_events.push(event);
    }
}

impl Scheduler {
    pub fn new(id: String, map: Arc<GridMap>, logger: DynLogger) -> Self {
        Self {
            id,
            path_finder: PathFinder::new(map),
            agvs: Vec::new(),
            tasks: Vec::new(),
            logger,
            uncommitted_events: Vec::new(),
        }
    }

    /// Scatter `count` AGVs over distinct random valid cells.
    pub fn with_random_fleet<R: Rng + ?Sized>(
        id: String,
        map: Arc<GridMap>,
        count: usize,
        rng: &mut R,
        logger: DynLogger,
    ) -> DomainResult<Self> {
        let valid = map.valid_positions();
        if count > valid.len() {
            return Err(DomainError::InvalidCommand {
                reason: format!(
                    "Cannot place {} AGVs on a map with {} free cells",
                    count,
                    valid.len()
                ),
            });
        }
        let starts: Vec<Coord> = valid.choose_multiple(rng, count).copied().collect();
        let mut scheduler = Self::new(id, map, logger);
        for position in starts {
            scheduler.add_agv(position)?;
        }
        Ok(scheduler)
    }

    pub fn add_agv(&mut self, position: Coord) -> DomainResult<AgvId> {
        if !self.path_finder.map().is_valid(position) {
            return Err(DomainError::InvalidCommand {
                reason: format!("AGV start {} is not a free cell", position),
            });
        }
        if self.agvs.iter().any(|a| a.position() == position) {
            return Err(DomainError::InvalidCommand {
                reason: format!("AGV start {} is already occupied", position),
            });
        }
        let agv_id = self.agvs.len() as AgvId;
        self.agvs.push(Agv::new(agv_id, position));
        self.add_event(FleetEvent::AgvRegistered {
            fleet_id: self.id.clone(),
            agv_id,
            position,
            timestamp: Utc::now(),
        });
        Ok(agv_id)
    }

    pub fn map(&self) -> &GridMap {
        self.path_finder.map()
    }

    pub fn path_finder(&self) -> &PathFinder {
        &self.path_finder
    }

    pub fn agvs(&self) -> &[Agv] {
        &self.agvs
    }

    pub fn agv(&self, id: AgvId) -> Option<&Agv> {
        self.agvs.iter().find(|a| a.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn idle_agvs(&self) -> Vec<&Agv> {
        self.agvs.iter().filter(|a| a.is_idle()).collect()
    }

    pub fn occupied_positions(&self) -> HashSet<Coord> {
        self.agvs.iter().map(|a| a.position()).collect()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot::capture(&self.agvs, &self.tasks)
    }
}
