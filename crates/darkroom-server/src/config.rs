//! Server configuration.
//!
//! Loading flow:
//! 1. Start with [`ServerConfig::default()`]
//! 2. If a config file is given and exists, its keys override the defaults
//! 3. Apply `DARKROOM_*` environment variable overrides
//! 4. Apply command-line flags (highest priority)
//!
//! Invalid environment values are logged and ignored.

use std::path::{Path, PathBuf};

use clap::Parser;
use darkroom_core::transform::Interpolation;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

const MB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Request body limit for the HTTP endpoints.
    pub max_body_bytes: usize,
    /// Largest accepted WebSocket message.
    pub max_message_bytes: usize,
    /// Outbound queue depth per WebSocket connection.
    pub send_queue_capacity: usize,
    /// Apply EXIF orientation when decoding uploads. Off by default so
    /// images come back with the pixel layout they were sent with.
    pub auto_orient: bool,
    /// Sampling used by non-quarter-turn rotations.
    pub rotate_interpolation: Interpolation,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".into(),
                "http://frontend:3000".into(),
            ],
            max_body_bytes: 25 * MB,
            max_message_bytes: 32 * MB,
            send_queue_capacity: 32,
            auto_orient: false,
            rotate_interpolation: Interpolation::Nearest,
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Load from an optional file, then apply environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(?path, "config file not found, using defaults");
            return Ok(Self::default());
        }
        debug!(?path, "loading config from file");
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply `DARKROOM_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let env = EnvReader(lookup);
        if let Some(v) = env.string("DARKROOM_HOST") {
            self.host = v;
        }
        if let Some(v) = env.u16("DARKROOM_PORT", 1, u16::MAX) {
            self.port = v;
        }
        if let Some(v) = env.string("DARKROOM_CORS_ORIGINS") {
            self.cors_origins = parse_list(&v);
        }
        if let Some(v) = env.usize("DARKROOM_MAX_BODY_BYTES", 1024, 1024 * MB) {
            self.max_body_bytes = v;
        }
        if let Some(v) = env.usize("DARKROOM_MAX_MESSAGE_BYTES", 1024, 1024 * MB) {
            self.max_message_bytes = v;
        }
        if let Some(v) = env.usize("DARKROOM_SEND_QUEUE_CAPACITY", 1, 10_000) {
            self.send_queue_capacity = v;
        }
        if let Some(v) = env.bool("DARKROOM_AUTO_ORIENT") {
            self.auto_orient = v;
        }
        if let Some(v) = env.interpolation("DARKROOM_ROTATE_INTERPOLATION") {
            self.rotate_interpolation = v;
        }
        if let Some(v) = env.bool("DARKROOM_LOG_JSON") {
            self.log_json = v;
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.host.clone_from(host);
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if args.log_json {
            self.log_json = true;
        }
    }
}

/// Command-line flags for `darkroom-server`.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "darkroom-server", version, about = "Darkroom image editing service")]
pub struct Args {
    /// Path to a JSON config file.
    #[arg(long, env = "DARKROOM_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long, short)]
    pub port: Option<u16>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

// ── Parsing helpers ─────────────────────────────────────────────────

pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Comma-separated list, blanks dropped.
pub fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

struct EnvReader<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.0)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn interpolation(&self, name: &str) -> Option<Interpolation> {
        let val = (self.0)(name)?;
        let result = Interpolation::parse(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid interpolation env var, ignoring");
        }
        result
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = (self.0)(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = (self.0)(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
        }
        result
    }
}
