//! Persistent settings
//!
//! Stored as pretty-printed JSON at `$SEALKIT_CONFIG` or, by default,
//! `<config dir>/sealkit/config.json`. A missing file means defaults.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};
use crate::memory::{self, LockPolicy};
use crate::seal;

const CONFIG_ENV: &str = "SEALKIT_CONFIG";
const CONFIG_DIR: &str = "sealkit";
const CONFIG_FILE: &str = "config.json";

/// Default keystream pad of a streamer (64 KiB).
pub const DEFAULT_STREAM_PAD_SIZE: usize = 0x10000;

/// Argon2 cost parameters
/// - Memory: 64 MB (65536 KiB)
/// - Iterations: 3
/// - Parallelism: 4 lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwHashParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for PwHashParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub lock_policy: LockPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub pad_size: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            pad_size: DEFAULT_STREAM_PAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `"warn"` or `"sealkit=debug"`
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Everything the library and CLI read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub memory: MemorySettings,
    pub pwhash: PwHashParams,
    pub stream: StreamSettings,
    pub log: LogSettings,
}

/// Resolve the config file path.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .ok_or_else(|| {
            CryptoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no configuration directory on this platform",
            ))
        })
}

impl Settings {
    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = fs::read(path)?;
        let settings: Settings = serde_json::from_slice(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(&json)?;
        file.write_all(b"\n")?;
        file.sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Install the process-wide lock policy and streamer pad size.
    pub fn apply(&self) -> Result<()> {
        self.validate()?;
        memory::set_lock_policy(self.memory.lock_policy);
        seal::set_default_pad_size(self.stream.pad_size)
    }

    fn validate(&self) -> Result<()> {
        if self.stream.pad_size == 0 {
            return Err(CryptoError::size(DEFAULT_STREAM_PAD_SIZE, 0));
        }
        if self.pwhash.time_cost == 0 || self.pwhash.parallelism == 0 {
            return Err(CryptoError::Format);
        }
        Ok(())
    }
}
