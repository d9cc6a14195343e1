use crate::domains::fleet::{FleetSnapshot, SnapshotSink};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, Mutex};

/// Fans snapshots out to any number of in-process observers.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<FleetSnapshot>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FleetSnapshot> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl SnapshotSink for BroadcastSink {
    async fn publish(&self, snapshot: &FleetSnapshot) -> Result<(), String> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(snapshot.clone())
            .map(|_| ())
            .map_err(|e| format!("Broadcast failed: {}", e))
    }
}

/// Writes each snapshot as one JSON document per line.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> SnapshotSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn publish(&self, snapshot: &FleetSnapshot) -> Result<(), String> {
        let mut line = serde_json::to_vec(snapshot).map_err(|e| e.to_string())?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.map_err(|e| e.to_string())?;
        writer.flush().await.map_err(|e| e.to_string())
    }
}

/// Publishes to several sinks; the first failure is reported after all ran.
pub struct FanOutSink {
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Box<dyn SnapshotSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl SnapshotSink for FanOutSink {
    async fn publish(&self, snapshot: &FleetSnapshot) -> Result<(), String> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.publish(snapshot).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
