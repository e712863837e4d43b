//! Host backed by a fixed scene description.

use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use super::{
    CameraInfo, HostApplication, HostError, HostVersion, RenderRequest, RenderedImage,
    SceneSnapshot,
};

/// On-disk scene description read by [`StaticHost::from_file`].
///
/// ```json
/// {
///   "version": {"version": "4.1.0", "build_date": "2024-03-25", "build_hash": "40a5e739e270"},
///   "scene": {"name": "Studio", "frame_current": 12, "frame_start": 1, "frame_end": 120},
///   "cameras": [{"name": "Camera", "location": [7.4, -6.9, 5.0], "active": true}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "static_version")]
    pub version: HostVersion,
    #[serde(default)]
    pub scene: SceneSnapshot,
    #[serde(default)]
    pub cameras: Vec<CameraInfo>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            version: static_version(),
            scene: SceneSnapshot::default(),
            cameras: Vec::new(),
        }
    }
}

fn static_version() -> HostVersion {
    HostVersion {
        version: String::from("static"),
        build_date: String::from("unknown"),
        build_hash: String::from("unknown"),
    }
}

/// Read-only host that serves a [`SceneDescription`]. It cannot render.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    description: SceneDescription,
}

impl StaticHost {
    /// Host with an empty scene and no cameras.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Host serving `description`.
    #[must_use]
    pub fn new(description: SceneDescription) -> Self {
        Self { description }
    }

    /// Loads the scene description at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::SceneRead`] or [`HostError::SceneParse`] when the
    /// file is unreadable or not a scene description.
    pub fn from_file(path: &Utf8Path) -> Result<Self, HostError> {
        let contents = fs::read_to_string(path).map_err(|source| HostError::SceneRead {
            path: path.to_owned(),
            source,
        })?;
        let description =
            serde_json::from_str(&contents).map_err(|source| HostError::SceneParse {
                path: path.to_owned(),
                source,
            })?;
        Ok(Self::new(description))
    }
}

impl HostApplication for StaticHost {
    fn version(&self) -> HostVersion {
        self.description.version.clone()
    }

    fn scene(&self) -> Result<SceneSnapshot, HostError> {
        Ok(self.description.scene.clone())
    }

    fn cameras(&self) -> Result<Vec<CameraInfo>, HostError> {
        Ok(self.description.cameras.clone())
    }

    fn render_camera(&self, _request: &RenderRequest) -> Result<RenderedImage, HostError> {
        Err(HostError::Unsupported {
            operation: "rendering",
        })
    }
}
