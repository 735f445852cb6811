//! Error types for the Resonaural engine.
//!
//! Only device failures and programmer errors surface as [`EngineError`].
//! Unknown pattern tags, unknown trigger kinds and calls on an inactive
//! engine are absorbed as no-ops by the engine itself.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Unified error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The audio backend could not provide an output device/stream.
    /// The engine stays inactive; `init` may be retried.
    #[error("Audio device unavailable: {message}")]
    DeviceAcquisition { message: String },

    /// A brainwave state name outside {delta, theta, alpha, gamma}.
    #[error("Invalid brainwave state '{name}' (expected delta, theta, alpha or gamma)")]
    InvalidState { name: String },

    /// The animation thread could not be started.
    #[error("Failed to start animation loop: {message}")]
    Scheduler { message: String },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Configuration text could not be parsed.
    #[error("Failed to parse configuration: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// A resonance payload could not be decoded.
    #[error("Malformed resonance payload: {source}")]
    Payload {
        #[from]
        source: serde_json::Error,
    },

    /// Error reading a configuration file.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Convenience constructor used by backends.
    pub fn device(message: impl Into<String>) -> Self {
        Self::DeviceAcquisition { message: message.into() }
    }
}
