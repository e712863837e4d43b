use std::sync::Arc;

use hostlink_protocol::{Params, Response};
use serde_json::json;

use crate::dispatch::{CommandError, CommandHandler};
use crate::host::HostApplication;

/// `get_scene_info`: snapshot of scene, host and render settings.
pub struct SceneInfo {
    host: Arc<dyn HostApplication>,
}

impl SceneInfo {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self { host }
    }
}

impl CommandHandler for SceneInfo {
    fn handle(&self, _params: &Params) -> Result<Response, CommandError> {
        let scene = self.host.scene()?;
        let version = self.host.version();
        Ok(Response::ok()
            .with_field(
                "scene",
                json!({
                    "name": scene.name,
                    "frame_current": scene.frame_current,
                    "frame_start": scene.frame_start,
                    "frame_end": scene.frame_end,
                }),
            )
            .with_field(
                "host",
                json!({
                    "version": version.version,
                    "build_date": version.build_date,
                    "build_hash": version.build_hash,
                }),
            )
            .with_field(
                "render",
                json!({
                    "engine": scene.render.engine,
                    "resolution_x": scene.render.resolution_x,
                    "resolution_y": scene.render.resolution_y,
                    "resolution_percentage": scene.render.resolution_percentage,
                }),
            ))
    }
}
