use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the window, camera controls, and scene assets.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// width = 1280
/// height = 720
/// camera_speed = 0.05
/// assets_dir = "assets"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// World units moved per frame while a movement key is held.
    pub camera_speed: f32,
    /// Degrees of rotation per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    /// Pitch is clamped to `±pitch_limit` degrees.
    pub pitch_limit: f32,
    /// Edge length of the square shadow map. Fixed for the lifetime of the renderer.
    pub shadow_map_size: u32,
    /// Root that model and skybox paths are resolved against.
    pub assets_dir: PathBuf,
    /// Skybox face images in +X, -X, +Y, -Y, +Z, -Z order, relative to `assets_dir`.
    pub skybox_faces: [String; 6],
    pub clear_color: [f32; 3],
    /// Start with the shadow map shown in place of the lit scene.
    pub show_depth_map: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Glade".to_string(),
            width: 1024,
            height: 768,
            camera_speed: 0.02,
            mouse_sensitivity: 0.1,
            pitch_limit: 359.0,
            shadow_map_size: 1024,
            assets_dir: PathBuf::from("assets"),
            skybox_faces: [
                "skybox/bluecloud_rt.tga".to_string(),
                "skybox/bluecloud_lf.tga".to_string(),
                "skybox/bluecloud_up.tga".to_string(),
                "skybox/bluecloud_dn.tga".to_string(),
                "skybox/bluecloud_bk.tga".to_string(),
                "skybox/bluecloud_ft.tga".to_string(),
            ],
            clear_color: [0.7, 0.7, 0.7],
            show_depth_map: false,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn camera_speed(mut self, speed: f32) -> Self {
        self.camera_speed = speed;
        self
    }

    pub fn mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    pub fn pitch_limit(mut self, degrees: f32) -> Self {
        self.pitch_limit = degrees;
        self
    }

    pub fn shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = size;
        self
    }

    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    pub fn show_depth_map(mut self, show: bool) -> Self {
        self.show_depth_map = show;
        self
    }

    /// Resolve a path relative to the asset directory.
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.camera_speed, 0.02);
        assert_eq!(config.mouse_sensitivity, 0.1);
        assert_eq!(config.shadow_map_size, 1024);
        assert_eq!(config.pitch_limit, 359.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str("width = 640\ncamera_speed = 0.5\n").unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 768);
        assert_eq!(config.camera_speed, 0.5);
        assert_eq!(config.title, "Glade");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_toml_file("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn builder_overrides() {
        let config = AppConfig::new()
            .title("Test")
            .size(320, 240)
            .assets_dir("/tmp/scene");
        assert_eq!(config.title, "Test");
        assert_eq!(config.asset_path("a.obj"), PathBuf::from("/tmp/scene/a.obj"));
    }
}
