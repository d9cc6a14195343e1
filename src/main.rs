use agv_fleet::adapters::inbound::LineCommandSource;
use agv_fleet::adapters::outbound::{
    init_buffered_logger, init_combined_logger, init_tracing, BroadcastSink, FanOutSink,
    JsonLinesSink,
};
use agv_fleet::application::FleetService;
use agv_fleet::domains::fleet::{Scheduler, SnapshotSink, TaskGenerator};
use agv_fleet::Config;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info").map_err(anyhow::Error::msg)?;

    info!("Starting AGV fleet simulation");

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(Some(Path::new(&config_path)))?;
    info!("Configuration loaded ({} AGVs, {}x{} map)", config.fleet.agv_count, config.map.size, config.map.size);

    let logger = init_buffered_logger(
        init_combined_logger(config.logging.file.as_deref(), config.logging.level_filter()),
        config.logging.buffer,
    );

    let map = Arc::new(config.map.build()?);
    println!("{}", serde_json::to_string(&map.describe())?);

    let mut rng = match config.fleet.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scheduler = Scheduler::with_random_fleet(
        config.fleet.id.clone(),
        map.clone(),
        config.fleet.agv_count,
        &mut rng,
        logger,
    )?;
    let generator = TaskGenerator::new(map, config.fleet.seed.map(|s| s.wrapping_add(1)));

    // Snapshots go to stdout, one JSON document per line, and to in-process observers.
    let broadcast = BroadcastSink::new(config.service.snapshot_buffer);
    let mut monitor = broadcast.subscribe();
    tokio::spawn(async move {
        loop {
            match monitor.recv().await {
                Ok(snapshot) => {
                    let busy = snapshot.agvs.iter().filter(|a| !a.path.is_empty()).count();
                    debug!("snapshot: {} of {} AGVs moving", busy, snapshot.agvs.len());
                }
                Err(RecvError::Lagged(skipped)) => debug!("monitor skipped {} snapshots", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });
    let sink: Arc<dyn SnapshotSink> = Arc::new(FanOutSink::new(vec![
        Box::new(broadcast),
        Box::new(JsonLinesSink::new(tokio::io::stdout())),
    ]));
    let (service, actor) = FleetService::new(scheduler, generator, sink, &config.service);

    // Held until shutdown so stdin EOF does not stop the tick loop.
    let _service_handle = actor.clone();
    let commands = LineCommandSource::new(actor);
    let input = tokio::spawn(async move {
        if let Err(e) = commands
            .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
        {
            error!("Command input stopped: {}", e);
        }
    });

    let statistics = service.run().await?;
    input.abort();

    info!(
        "Shutting down: {} of {} tasks delivered",
        statistics.tasks_completed, statistics.tasks_submitted
    );
    Ok(())
}
