use std::sync::Arc;

use hostlink_protocol::{Params, Response};
use serde_json::{Value, json};

use crate::dispatch::{CommandError, CommandHandler};
use crate::host::HostApplication;

/// `list_cameras`: every camera plus the active one.
pub struct ListCameras {
    host: Arc<dyn HostApplication>,
}

impl ListCameras {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self { host }
    }
}

impl CommandHandler for ListCameras {
    fn handle(&self, _params: &Params) -> Result<Response, CommandError> {
        let cameras = self.host.cameras()?;
        let active = cameras
            .iter()
            .find(|camera| camera.active)
            .map_or(Value::Null, |camera| Value::String(camera.name.clone()));
        let count = cameras.len();
        let listed: Vec<Value> = cameras
            .into_iter()
            .map(|camera| {
                json!({
                    "name": camera.name,
                    "location": camera.location,
                    "rotation": camera.rotation,
                    "active": camera.active,
                })
            })
            .collect();
        Ok(Response::ok()
            .with_field("cameras", listed)
            .with_field("count", count)
            .with_field("active_camera", active))
    }
}
