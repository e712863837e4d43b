//! Built-in commands served by every host.

mod cameras;
mod execute;
mod health;
mod params;
mod render;
mod scene;

use std::sync::Arc;

use crate::dispatch::RegistryBuilder;
use crate::host::{CodeExecutor, HostApplication};

pub use self::cameras::ListCameras;
pub use self::execute::ExecuteCode;
pub use self::health::HealthCheck;
pub use self::render::RenderCamera;
pub use self::scene::SceneInfo;

/// Liveness probe.
pub const HEALTH_CHECK: &str = "health_check";
/// Scene, host and render snapshot.
pub const GET_SCENE_INFO: &str = "get_scene_info";
/// Camera listing.
pub const LIST_CAMERAS: &str = "list_cameras";
/// Code payload execution.
pub const EXECUTE_CODE: &str = "execute_code";
/// Camera render.
pub const RENDER_CAMERA: &str = "render_camera";

/// The built-in command set over one host.
pub struct BuiltinCommands {
    host: Arc<dyn HostApplication>,
    executor: Option<Arc<dyn CodeExecutor>>,
}

impl BuiltinCommands {
    /// Commands over `host` with code execution disabled.
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self {
            host,
            executor: None,
        }
    }

    /// Enables `execute_code` through `executor`.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn CodeExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Adds every built-in command to `builder`.
    #[must_use]
    pub fn register(self, builder: RegistryBuilder) -> RegistryBuilder {
        let Self { host, executor } = self;
        builder
            .register(HEALTH_CHECK, HealthCheck::new(Arc::clone(&host)))
            .register(GET_SCENE_INFO, SceneInfo::new(Arc::clone(&host)))
            .register(LIST_CAMERAS, ListCameras::new(Arc::clone(&host)))
            .register(RENDER_CAMERA, RenderCamera::new(Arc::clone(&host)))
            .register(EXECUTE_CODE, ExecuteCode::new(host, executor))
    }
}
