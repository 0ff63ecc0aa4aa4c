use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::{clog_debug, Error, Result};

fn default_sync_interval_secs() -> u64 {
    5
}

fn default_loop_delay_ms() -> u64 {
    1000
}

fn default_dispatch_timeout_secs() -> u64 {
    120
}

fn default_mirror_writes() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between periodic pulls from the remote task service.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Milliseconds to sleep between run loop iterations.
    #[serde(default = "default_loop_delay_ms")]
    pub loop_delay_ms: u64,
    /// Ceiling for a single collaborator invocation.
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,
    /// Mirror local store mutations to the remote service.
    #[serde(default = "default_mirror_writes")]
    pub mirror_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_interval_secs: default_sync_interval_secs(),
            loop_delay_ms: default_loop_delay_ms(),
            dispatch_timeout_secs: default_dispatch_timeout_secs(),
            mirror_writes: default_mirror_writes(),
        }
    }
}

impl Config {
    pub fn conductor_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".conductor"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::conductor_dir()?.join("conductor.toml"))
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn loop_delay(&self) -> Duration {
        Duration::from_millis(self.loop_delay_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        clog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            clog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        clog_debug!(
            "Config loaded: sync_interval={}s loop_delay={}ms dispatch_timeout={}s mirror_writes={}",
            config.sync_interval_secs,
            config.loop_delay_ms,
            config.dispatch_timeout_secs,
            config.mirror_writes
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::conductor_dir()?;
        if !dir.exists() {
            clog_debug!("Creating conductor directory");
            fs::create_dir_all(&dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        clog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
