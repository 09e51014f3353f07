//! Service configuration via a TOML file.
//!
//! Every section is optional; missing keys fall back to the defaults shown in
//! [`Config::default_toml`]. The `--bind` flag overrides `[server] bind`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub ringbuffer: RingbufferConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
    #[serde(default = "default_partition_count")]
    pub partition_count: u32,
    /// Interval of the background sweep removing expired entries.
    #[serde(default = "default_expiry_sweep_ms")]
    pub expiry_sweep_ms: u64,
}

fn default_instance_name() -> String {
    "datagrid-instance".to_string()
}

fn default_partition_count() -> u32 {
    271
}

fn default_expiry_sweep_ms() -> u64 {
    1_000
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            partition_count: default_partition_count(),
            expiry_sweep_ms: default_expiry_sweep_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Name of the map served under `/cache`.
    #[serde(default = "default_map_name")]
    pub name: String,
    /// 0 disables expiry.
    #[serde(default = "default_ttl_seconds")]
    pub time_to_live_seconds: u64,
    /// 0 disables size eviction.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
    /// Default wait for `POST /cache/lock/{key}`.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_map_name() -> String {
    "default".to_string()
}

fn default_ttl_seconds() -> u64 {
    3_600
}

fn default_max_entries() -> usize {
    100_000
}

fn default_max_listeners() -> usize {
    32
}

fn default_lock_timeout_ms() -> u64 {
    30_000
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: default_map_name(),
            time_to_live_seconds: default_ttl_seconds(),
            max_entries: default_max_entries(),
            max_listeners: default_max_listeners(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl MapConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingbufferConfig {
    /// Name of the ring buffer served under `/ringbuffer`.
    #[serde(default = "default_ringbuffer_name")]
    pub name: String,
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// Longest a read waits for `minCount` items before returning what it has.
    #[serde(default = "default_read_wait_ms")]
    pub read_wait_ms: u64,
}

fn default_ringbuffer_name() -> String {
    "ringbuffer-demo".to_string()
}

fn default_capacity() -> u64 {
    10_000
}

fn default_read_wait_ms() -> u64 {
    5_000
}

impl Default for RingbufferConfig {
    fn default() -> Self {
        Self {
            name: default_ringbuffer_name(),
            capacity: default_capacity(),
            read_wait_ms: default_read_wait_ms(),
        }
    }
}

impl Config {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# datagrid-facade configuration

[server]
bind = "0.0.0.0:8080"

[logging]
# Overridden by RUST_LOG when set.
level = "info"

[grid]
instance_name = "datagrid-instance"
partition_count = 271
expiry_sweep_ms = 1000

[map]
name = "default"
time_to_live_seconds = 3600   # 0 = entries never expire
max_entries = 100000          # 0 = no size eviction (LRU otherwise)
max_listeners = 32
lock_timeout_ms = 30000

[ringbuffer]
name = "ringbuffer-demo"
capacity = 10000
read_wait_ms = 5000
"#
    }

    /// Read, parse and validate config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.server.bind))
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.grid.partition_count == 0 {
            bail!("grid.partition_count must be greater than 0");
        }
        if self.ringbuffer.capacity == 0 {
            bail!("ringbuffer.capacity must be greater than 0");
        }
        if self.map.name.is_empty() || self.ringbuffer.name.is_empty() {
            bail!("map.name and ringbuffer.name must not be empty");
        }
        Ok(())
    }
}
