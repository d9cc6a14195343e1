use crate::common::DomainResult;
use crate::domains::path_planning::{
    rect_cells, Coord, GridMap, WAREHOUSE_BOUNDARY, WAREHOUSE_RACKS, WAREHOUSE_SIZE,
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub fleet: FleetConfig,
    pub map: MapConfig,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub id: String,
    pub agv_count: usize,
    /// Fixed seed for AGV placement and task generation; random when unset.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub size: i32,
    pub obstacles: Vec<RectConfig>,
    pub boundary_points: Vec<(i32, i32)>,
}

/// Inclusive cell rectangle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RectConfig {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub tick_interval_ms: u64,
    pub command_buffer: usize,
    pub snapshot_buffer: usize,
    pub retry_pending: bool,
    pub stats_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: String,
    pub buffer: usize,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Layered load: defaults, then the optional TOML file, then
    /// `AGV__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Config::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        let config: Config = builder
            .add_source(::config::Environment::with_prefix("AGV").separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.map.size <= 0 {
            bail!("map.size must be positive, got {}", self.map.size);
        }
        if self.fleet.agv_count == 0 {
            bail!("fleet.agv_count must be at least 1");
        }
        if self.service.tick_interval_ms == 0 {
            bail!("service.tick_interval_ms must be at least 1");
        }
        if self.service.command_buffer == 0 {
            bail!("service.command_buffer must be at least 1");
        }
        for rect in &self.map.obstacles {
            if rect.min_x > rect.max_x || rect.min_y > rect.max_y {
                bail!("obstacle {:?} has inverted bounds", rect);
            }
        }
        Ok(())
    }
}

impl MapConfig {
    pub fn build(&self) -> DomainResult<GridMap> {
        let obstacles = self
            .obstacles
            .iter()
            .map(|r| rect_cells(r.min_x, r.max_x, r.min_y, r.max_y))
            .collect();
        GridMap::new(
            self.size,
            obstacles,
            self.boundary_points.iter().copied().map(Coord::from),
        )
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            id: "warehouse-fleet".to_string(),
            agv_count: 15,
            seed: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size: WAREHOUSE_SIZE,
            obstacles: WAREHOUSE_RACKS
                .iter()
                .map(|&(min_x, max_x, min_y, max_y)| RectConfig { min_x, max_x, min_y, max_y })
                .collect(),
            boundary_points: WAREHOUSE_BOUNDARY.to_vec(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            command_buffer: 100,
            snapshot_buffer: 16,
            retry_pending: false,
            stats_interval_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
            buffer: 256,
        }
    }
}
