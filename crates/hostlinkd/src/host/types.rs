use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Version details reported by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVersion {
    pub version: String,
    #[serde(default)]
    pub build_date: String,
    #[serde(default)]
    pub build_hash: String,
}

/// Output settings of the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub engine: String,
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub resolution_percentage: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            engine: String::from("NONE"),
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: 100,
        }
    }
}

/// Read-only snapshot of scene state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub name: String,
    pub frame_current: i64,
    pub frame_start: i64,
    pub frame_end: i64,
    #[serde(default)]
    pub render: RenderSettings,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            name: String::from("Scene"),
            frame_current: 1,
            frame_start: 1,
            frame_end: 250,
            render: RenderSettings::default(),
        }
    }
}

/// A camera object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub name: String,
    #[serde(default)]
    pub location: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default)]
    pub active: bool,
}

/// Image encodings a render may be returned in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

/// Errors encountered while parsing an [`ImageFormat`] from text.
pub type ImageFormatParseError = strum::ParseError;

/// Parameters of a `render_camera` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub camera: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub quality: u8,
}

/// Encoded image produced by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// Base64 text of the encoded image.
    pub data: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}
