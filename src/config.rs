//! Viewer configuration loaded from an optional JSON file.
//!
//! Every section defaults, so a file only needs the keys it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::CameraConfig;
use crate::chart::ChartConfig;
use crate::colorize::{Rgb, ViewMode};
use crate::engine::SyntheticConfig;
use crate::error::ViewerError;
use crate::overlay::OverlayConfig;
use crate::run_loop::RunLoopConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub map_width: usize,
    pub map_height: usize,
    pub minimap_width: usize,
    pub minimap_height: usize,
    pub chart_width: usize,
    pub chart_height: usize,
    /// Height of the status strip under the map.
    pub status_height: usize,
    pub background: Rgb,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            map_width: 800,
            map_height: 500,
            minimap_width: 200,
            minimap_height: 100,
            chart_width: 300,
            chart_height: 120,
            status_height: 40,
            background: [12, 12, 18],
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub view_mode: Option<ViewMode>,
    pub camera: CameraConfig,
    pub layout: LayoutConfig,
    pub run_loop: RunLoopConfig,
    pub overlay: OverlayConfig,
    pub chart: ChartConfig,
    pub engine: SyntheticConfig,
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ViewerError::ConfigIo {
            path: shown.clone(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ViewerError::ConfigParse {
            path: shown.clone(),
            source,
        })?;
        info!(path = %shown, "loaded viewer config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "camera": {{ "max_scale": 12.0 }}, "run_loop": {{ "speed": "veryfast" }}, "view_mode": "terrain" }}"#
        )
        .unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.max_scale, 12.0);
        assert_eq!(config.camera.min_scale, 0.25);
        assert_eq!(config.run_loop.speed, crate::run_loop::RunSpeed::VeryFast);
        assert_eq!(config.view_mode, Some(ViewMode::Terrain));
        assert_eq!(config.layout.minimap_width, 200);
        assert_eq!(config.overlay.rules.len(), 2);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(ViewerConfig::load(&missing), Err(ViewerError::ConfigIo { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(ViewerConfig::load(&bad), Err(ViewerError::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_view_mode_falls_back_to_biome() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "view_mode": "heatmap" }}"#).unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.view_mode, Some(ViewMode::Biome));
    }
}
