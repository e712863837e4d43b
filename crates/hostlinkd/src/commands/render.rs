use std::sync::Arc;

use hostlink_protocol::{Params, Response};

use crate::dispatch::{CommandError, CommandHandler};
use crate::host::{HostApplication, HostError, ImageFormat, RenderRequest};

use super::params::{optional_int_in, optional_str};

const DEFAULT_CAMERA: &str = "Camera";
const DEFAULT_WIDTH: u32 = 1920;
const DEFAULT_HEIGHT: u32 = 1080;
const DEFAULT_QUALITY: u32 = 90;
const MAX_DIMENSION: u32 = 16_384;

/// `render_camera`: renders through a named camera.
pub struct RenderCamera {
    host: Arc<dyn HostApplication>,
}

impl RenderCamera {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self { host }
    }
}

fn parse_request(params: &Params) -> Result<RenderRequest, CommandError> {
    let camera = optional_str(params, "camera", DEFAULT_CAMERA)?.to_owned();
    let width = optional_int_in(params, "width", DEFAULT_WIDTH, 1..=MAX_DIMENSION)?;
    let height = optional_int_in(params, "height", DEFAULT_HEIGHT, 1..=MAX_DIMENSION)?;
    let format = optional_str(params, "format", "PNG")?
        .parse::<ImageFormat>()
        .map_err(|_| CommandError::invalid_parameter("format", "expected PNG or JPEG"))?;
    let quality = optional_int_in(params, "quality", DEFAULT_QUALITY, 1..=100)?;
    let quality = u8::try_from(quality)
        .map_err(|_| CommandError::invalid_parameter("quality", "expected 1..=100"))?;
    Ok(RenderRequest {
        camera,
        width,
        height,
        format,
        quality,
    })
}

impl CommandHandler for RenderCamera {
    fn handle(&self, params: &Params) -> Result<Response, CommandError> {
        let request = parse_request(params)?;
        let known = self
            .host
            .cameras()?
            .iter()
            .any(|camera| camera.name == request.camera);
        if !known {
            return Err(HostError::CameraNotFound {
                name: request.camera,
            }
            .into());
        }
        let image = self.host.render_camera(&request)?;
        Ok(Response::ok()
            .with_field("image", image.data)
            .with_field("camera_used", request.camera)
            .with_field("width", image.width)
            .with_field("height", image.height)
            .with_field("format", image.format.to_string()))
    }
}
