//! Server configuration
//!
//! Read from the environment at startup.

use crate::archive::{validate_extension, DEFAULT_EXTENSION};
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Default listen port
pub const DEFAULT_PORT: u16 = 4000;

/// Runtime configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket server binds to
    pub bind_addr: SocketAddr,

    /// Directory holding archived audio
    pub audio_dir: PathBuf,

    /// Extension given to archived chunks
    pub artifact_extension: String,

    /// JSON table of session tokens
    pub sessions_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            audio_dir: PathBuf::from("public/audios"),
            artifact_extension: DEFAULT_EXTENSION.to_string(),
            sessions_file: PathBuf::from("sessions.json"),
        }
    }
}

impl ServerConfig {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let ip: IpAddr = match lookup("WALKIE_BIND_IP") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("WALKIE_BIND_IP is not an IP address: {raw:?}"))?,
            None => defaults.bind_addr.ip(),
        };
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port: {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let artifact_extension = lookup("WALKIE_ARTIFACT_EXT").unwrap_or(defaults.artifact_extension);
        validate_extension(&artifact_extension).context("WALKIE_ARTIFACT_EXT is not usable")?;

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            audio_dir: lookup("WALKIE_AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.audio_dir),
            artifact_extension,
            sessions_file: lookup("WALKIE_SESSIONS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.sessions_file),
        })
    }
}
