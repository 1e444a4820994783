//! Camera capture for attaching a photo to a report.
//!
//! [`CaptureDevice`] opens a live [`VideoStream`]; [`CameraSession`] owns at most
//! one open stream at a time and guarantees it is stopped on capture, close or drop.

mod device;
mod ffmpeg;
mod session;

pub use device::{encode_jpeg, CameraError, CaptureDevice, FacingMode, Frame, Photo, VideoStream};
pub use ffmpeg::V4l2FfmpegDevice;
pub use session::{CameraSession, CameraState};
