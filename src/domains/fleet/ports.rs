use super::projections::FleetSnapshot;
use async_trait::async_trait;

/// Port the fleet service publishes state through. Adapters decide the wire
/// encoding and who is listening.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn publish(&self, snapshot: &FleetSnapshot) -> Result<(), String>;
}
