//! Interactive viewer for tile-world simulations.
//!
//! Re-exports modules for use by the binary and integration tests.

pub mod biomes;
pub mod camera;
pub mod canvas;
pub mod chart;
pub mod colorize;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod minimap;
pub mod overlay;
pub mod raster;
pub mod run_loop;
pub mod session;
pub mod tilemap;
pub mod viewer;

pub use camera::{Camera, CameraConfig};
pub use colorize::ViewMode;
pub use config::ViewerConfig;
pub use engine::{Engine, SyntheticEngine, Variant};
pub use error::{EngineError, ViewerError};
pub use session::{FrameReport, RenderSession, ViewerEvent};
