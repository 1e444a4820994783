use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::camera::device::{
    encode_jpeg, CameraError, CaptureDevice, FacingMode, Photo, VideoStream,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CameraState {
    /// Never opened
    Idle,
    /// Live stream held
    Open,
    /// Opened before, released since
    Closed,
}

/// Stops the wrapped stream when dropped, whichever path drops it
struct ActiveStream(Box<dyn VideoStream>);

impl Drop for ActiveStream {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// Exclusive owner of at most one open camera stream
pub struct CameraSession {
    device: Arc<dyn CaptureDevice>,
    facing: FacingMode,
    jpeg_quality: u8,
    stream: Option<ActiveStream>,
    state: CameraState,
}

impl CameraSession {
    pub fn new(device: Arc<dyn CaptureDevice>, jpeg_quality: u8) -> Self {
        Self {
            device,
            facing: FacingMode::Environment,
            jpeg_quality,
            stream: None,
            state: CameraState::Idle,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Opens the rear camera and starts the live preview.
    ///
    /// An already open stream is released before the new one is requested.
    /// On failure the session keeps its previous (non-open) state.
    pub async fn open(&mut self) -> Result<(), CameraError> {
        self.close();

        let stream = self.device.open(self.facing).await.map_err(|e| {
            tracing::warn!("Failed to open camera: {}", e);
            e
        })?;

        self.stream = Some(ActiveStream(stream));
        self.state = CameraState::Open;
        Ok(())
    }

    /// Current live frame as JPEG; the session stays open
    pub async fn preview(&mut self) -> Result<Photo, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotOpen)?;
        let frame = stream.0.current_frame().await?;
        encode_jpeg(frame, self.jpeg_quality)
    }

    /// Takes a still from the live stream and closes the session.
    ///
    /// The stream is released whether the frame grab or the encode fails.
    pub async fn capture(&mut self) -> Result<Photo, CameraError> {
        let mut stream = self.stream.take().ok_or(CameraError::NotOpen)?;
        self.state = CameraState::Closed;

        let result = match stream.0.current_frame().await {
            Ok(frame) => encode_jpeg(frame, self.jpeg_quality),
            Err(e) => Err(e),
        };
        drop(stream);

        match &result {
            Ok(photo) => tracing::info!("Photo captured ({}x{})", photo.width, photo.height),
            Err(e) => tracing::warn!("Photo capture failed: {}", e),
        }

        result
    }

    /// Releases the stream if one is held. Safe to call in any state.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            self.state = CameraState::Closed;
        }
    }
}
