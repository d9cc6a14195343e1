use super::projections::{FleetSnapshot, FleetStatistics};
use crate::domains::path_planning::Coord;
use tokio::sync::{mpsc, oneshot};

/// Commands accepted by the fleet service loop.
#[derive(Debug)]
pub enum FleetCommand {
    /// Generate a random task and try to assign it.
    StartTask,
    SubmitTask {
        pickup: Coord,
        delivery: Coord,
    },
    GetSnapshot {
        reply: oneshot::Sender<FleetSnapshot>,
    },
    GetStatistics {
        reply: oneshot::Sender<FleetStatistics>,
    },
    Shutdown,
}

/// Cloneable handle used by inbound adapters to talk to the service.
#[derive(Debug, Clone)]
pub struct FleetCommandActor {
    command_sender: mpsc::Sender<FleetCommand>,
}

impl FleetCommandActor {
    pub fn new(command_sender: mpsc::Sender<FleetCommand>) -> Self {
        Self { command_sender }
    }

    pub async fn start_task(&self) -> Result<(), String> {
        self.send(FleetCommand::StartTask).await
    }

    pub async fn submit_task(&self, pickup: Coord, delivery: Coord) -> Result<(), String> {
        self.send(FleetCommand::SubmitTask { pickup, delivery }).await
    }

    pub async fn snapshot(&self) -> Result<FleetSnapshot, String> {
        let (reply, response) = oneshot::channel();
        self.send(FleetCommand::GetSnapshot { reply }).await?;
        response
            .await
            .map_err(|e| format!("Snapshot reply dropped: {}", e))
    }

    pub async fn statistics(&self) -> Result<FleetStatistics, String> {
        let (reply, response) = oneshot::channel();
        self.send(FleetCommand::GetStatistics { reply }).await?;
        response
            .await
            .map_err(|e| format!("Statistics reply dropped: {}", e))
    }

    pub async fn shutdown(&self) -> Result<(), String> {
        self.send(FleetCommand::Shutdown).await
    }

    async fn send(&self, command: FleetCommand) -> Result<(), String> {
        self.command_sender
            .send(command)
            .await
            .map_err(|e| format!("Failed to send command: {}", e))
    }
}
