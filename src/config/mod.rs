//! Configuration management for sealkit
//!
//! Handles:
//! - Memory locking policy
//! - Argon2 cost parameters
//! - Streamer pad size and log level

mod settings;

pub use settings::{
    config_path, LogSettings, MemorySettings, PwHashParams, Settings, StreamSettings,
    DEFAULT_STREAM_PAD_SIZE,
};
