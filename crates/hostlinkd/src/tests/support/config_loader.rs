//! Configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::fs;

use camino::Utf8PathBuf;
use hostlink_config::{Config, ConfigError};
use ortho_config::OrthoConfig;
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Loader binding an ephemeral loopback port, optionally with a scene file.
pub struct TestConfigLoader {
    scene_dir: TempDir,
    scene: Option<String>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene_dir: TempDir::new().expect("failed to create temporary scene directory"),
            scene: None,
        }
    }

    #[must_use]
    pub fn with_scene(mut self, scene: &str) -> Self {
        self.scene = Some(scene.to_owned());
        self
    }

    fn scene_file(&self) -> Option<Utf8PathBuf> {
        let contents = self.scene.as_ref()?;
        let path = self.scene_dir.path().join("scene.json");
        fs::write(&path, contents).expect("write scene file");
        Some(Utf8PathBuf::from_path_buf(path).expect("temporary scene path was not valid UTF-8"))
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(Config {
            port: 0,
            scene_file: self.scene_file(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an invalid port.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        let args = vec![
            OsString::from("hostlinkd"),
            OsString::from("--port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args).map_err(ConfigError::Load)
    }
}
