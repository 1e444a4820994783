use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::shared::constants::{PHOTO_CONTENT_TYPE, PHOTO_FILENAME};

/// One decoded video frame, packed RGB8 at the stream's native resolution
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Which physical camera to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointed at the reported issue
    #[default]
    Environment,
    /// Front camera
    User,
}

/// A JPEG still produced by a capture
#[derive(Clone, PartialEq)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Photo {
    pub fn filename(&self) -> &'static str {
        PHOTO_FILENAME
    }

    pub fn content_type(&self) -> &'static str {
        PHOTO_CONTENT_TYPE
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum CameraError {
    /// Permission denied, device missing or busy
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    #[error("camera session is not open")]
    NotOpen,

    #[error("no frame received from camera")]
    NoFrame,

    #[error("failed to encode photo: {0}")]
    Encode(String),

    #[error("camera stream failed: {0}")]
    Stream(String),
}

/// A platform camera that can hand out exclusive live streams
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError>;
}

/// An open capture stream. Holding one means holding the device.
#[async_trait]
pub trait VideoStream: Send {
    /// Most recent frame of the live stream
    async fn current_frame(&mut self) -> Result<Frame, CameraError>;

    /// Stops every track of the stream. Must be idempotent.
    fn stop(&mut self);
}

/// Draws `frame` into a raster sized to its native resolution and encodes it as JPEG
pub fn encode_jpeg(frame: Frame, quality: u8) -> Result<Photo, CameraError> {
    let (width, height) = (frame.width, frame.height);
    if width == 0 || height == 0 {
        return Err(CameraError::Encode(format!(
            "frame has no pixels ({}x{})",
            width, height
        )));
    }

    let raster = RgbImage::from_raw(width, height, frame.data).ok_or_else(|| {
        CameraError::Encode(format!("frame buffer too small for {}x{}", width, height))
    })?;

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&raster)
        .map_err(|e| CameraError::Encode(e.to_string()))?;

    tracing::debug!(
        "Encoded {}x{} frame to {} byte JPEG",
        width,
        height,
        bytes.len()
    );

    Ok(Photo {
        bytes,
        width,
        height,
    })
}
