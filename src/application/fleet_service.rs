use crate::common::{ApplicationError, ApplicationResult, DomainEvent};
use crate::config::ServiceConfig;
use crate::domains::fleet::{
    FleetCommand, FleetCommandActor, FleetStatistics, Scheduler, SnapshotSink, Task, TaskGenerator,
};
use crate::domains::path_planning::Coord;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Single owner of the scheduler.
///
/// Commands and timer ticks are handled one at a time inside one loop, so an
/// assignment never interleaves with a motion step.
pub struct FleetService {
    scheduler: Scheduler,
    generator: TaskGenerator,
    sink: Arc<dyn SnapshotSink>,
    statistics: FleetStatistics,
    command_receiver: mpsc::Receiver<FleetCommand>,
    tick_interval: Duration,
    stats_interval: Duration,
    retry_pending: bool,
}

impl FleetService {
    /// Returns the service and the handle clients use to reach it. The loop
    /// ends once every handle is dropped.
    pub fn new(
        scheduler: Scheduler,
        generator: TaskGenerator,
        sink: Arc<dyn SnapshotSink>,
        config: &ServiceConfig,
    ) -> (Self, FleetCommandActor) {
        let (command_sender, command_receiver) = mpsc::channel(config.command_buffer.max(1));
        let service = Self {
            scheduler,
            generator,
            sink,
            statistics: FleetStatistics::new(),
            command_receiver,
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            stats_interval: Duration::from_secs(config.stats_interval_secs.max(1)),
            retry_pending: config.retry_pending,
        };
        (service, FleetCommandActor::new(command_sender))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn statistics(&self) -> &FleetStatistics {
        &self.statistics
    }

    pub async fn run(mut self) -> ApplicationResult<FleetStatistics> {
        info!(
            "Fleet {} running with {} AGVs, tick every {:?}",
            self.scheduler.id,
            self.scheduler.agvs().len(),
            self.tick_interval
        );
        self.drain_events();

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        let mut heartbeat = interval(self.stats_interval);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(FleetCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command).await,
                    }
                }

                _ = ticker.tick() => {
                    self.handle_tick().await;
                }

                _ = heartbeat.tick() => {
                    self.log_statistics();
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received");
                    break;
                }
            }
        }

        info!("Fleet {} stopped", self.scheduler.id);
        self.log_statistics();
        Ok(self.statistics)
    }

    pub async fn handle_command(&mut self, command: FleetCommand) {
        match command {
            FleetCommand::StartTask => match self.generator.generate() {
                Ok(task) => self.submit(task).await,
                Err(e) => warn!("Could not generate task: {}", e),
            },
            FleetCommand::SubmitTask { pickup, delivery } => {
                if let Err(e) = self.submit_at(pickup, delivery).await {
                    warn!("Rejected task request {} -> {}: {}", pickup, delivery, e);
                }
            }
            FleetCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.scheduler.snapshot());
            }
            FleetCommand::GetStatistics { reply } => {
                let _ = reply.send(self.statistics.clone());
            }
            FleetCommand::Shutdown => {}
        }
    }

    /// One timer period: optional retry of pending tasks, then one motion step.
    pub async fn handle_tick(&mut self) {
        let retried = if self.retry_pending {
            self.scheduler.retry_pending()
        } else {
            0
        };
        let moved = self.scheduler.tick();
        self.drain_events();
        if moved || retried > 0 {
            self.publish().await;
        }
    }

    async fn submit_at(&mut self, pickup: Coord, delivery: Coord) -> ApplicationResult<()> {
        let task = self.generator.task_at(pickup, delivery)?;
        self.submit(task).await;
        Ok(())
    }

    async fn submit(&mut self, task: Task) {
        let task_id = task.id;
        let (pickup, delivery) = (task.pickup, task.delivery);
        if self.scheduler.assign_task(task) {
            info!("Task {} ({} -> {}) assigned", task_id, pickup, delivery);
        } else {
            info!("Task {} ({} -> {}) pending", task_id, pickup, delivery);
        }
        self.drain_events();
        self.publish().await;
    }

    async fn publish(&self) {
        if let Err(e) = self.try_publish().await {
            warn!("{}", e);
        }
    }

    async fn try_publish(&self) -> ApplicationResult<()> {
        let snapshot = self.scheduler.snapshot();
        self.sink
            .publish(&snapshot)
            .await
            .map_err(ApplicationError::Sink)
    }

    fn drain_events(&mut self) {
        for event in self.scheduler.take_uncommitted_events() {
            debug!(
                event = event.event_type(),
                fleet = event.aggregate_id(),
                "{:?}",
                event
            );
            self.statistics.apply_event(&event);
        }
    }

    fn log_statistics(&self) {
        let s = &self.statistics;
        info!(
            "Fleet status: {} AGVs, tasks submitted={} assigned={} completed={} deferred={} in_flight={}, cells travelled={}",
            s.agv_count,
            s.tasks_submitted,
            s.tasks_assigned,
            s.tasks_completed,
            s.tasks_deferred,
            s.tasks_in_flight(),
            s.cells_travelled
        );
    }
}
