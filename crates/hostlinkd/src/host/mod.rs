//! Seams between the server and the host application it runs inside.
//!
//! The built-in commands only see the host through [`HostApplication`] and,
//! when code execution is enabled, a [`CodeExecutor`]. [`StaticHost`] is a
//! self-contained implementation backed by a JSON scene description.

mod errors;
mod executor;
mod static_host;
mod types;

pub use self::errors::{ExecutionError, HostError};
pub use self::executor::{CodeExecutor, ExecutionScope};
pub use self::static_host::{SceneDescription, StaticHost};
pub use self::types::{
    CameraInfo, HostVersion, ImageFormat, ImageFormatParseError, RenderRequest, RenderSettings,
    RenderedImage, SceneSnapshot,
};

/// Read and render access to the host application.
pub trait HostApplication: Send + Sync {
    /// Version information of the running host.
    fn version(&self) -> HostVersion;

    /// Snapshot of the current scene.
    fn scene(&self) -> Result<SceneSnapshot, HostError>;

    /// Cameras in the current scene.
    fn cameras(&self) -> Result<Vec<CameraInfo>, HostError>;

    /// Renders the scene through a camera.
    fn render_camera(&self, request: &RenderRequest) -> Result<RenderedImage, HostError>;
}
