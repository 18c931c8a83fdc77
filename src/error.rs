//! Error types shared by the engine boundary and the viewer front-ends.

use thiserror::Error;

/// Failures reported by a simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("simulation not initialized")]
    NotInitialized,

    #[error("invalid world dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("cannot advance by {requested} ticks: {reason}")]
    InvalidAdvance { requested: u32, reason: String },
}

/// Failures surfaced by the session, the window and the exporters.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine could not be brought up. No session exists afterwards.
    #[error("engine initialization failed: {0}")]
    Init(#[source] EngineError),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}
