//! V4L2 cameras read through an `ffmpeg` child process.
//!
//! ffmpeg decodes the device to raw RGB24 on stdout. A reader task slices stdout
//! into frames and publishes only the newest one, so a capture always sees the
//! live picture instead of whatever sat in the pipe buffer.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::CameraConfig;
use crate::modules::camera::device::{CameraError, CaptureDevice, FacingMode, Frame, VideoStream};

type LatestFrame = Option<Arc<Frame>>;

/// Camera backed by a `/dev/videoN` node
pub struct V4l2FfmpegDevice {
    config: CameraConfig,
}

impl V4l2FfmpegDevice {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    fn device_path(&self, facing: FacingMode) -> Result<&str, CameraError> {
        match facing {
            FacingMode::Environment => Ok(&self.config.environment_device),
            FacingMode::User => self.config.user_device.as_deref().ok_or_else(|| {
                CameraError::Unavailable("no user-facing camera configured".to_string())
            }),
        }
    }
}

#[async_trait]
impl CaptureDevice for V4l2FfmpegDevice {
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError> {
        let path = self.device_path(facing)?;
        let stream = self.start(path).await?;
        Ok(Box::new(stream))
    }
}

impl V4l2FfmpegDevice {
    async fn start(&self, path: &str) -> Result<FfmpegStream, CameraError> {
        tokio::fs::metadata(path)
            .await
            .map_err(|e| CameraError::Unavailable(format!("{}: {}", path, e)))?;

        let (width, height) = (self.config.width, self.config.height);
        let mut child = Command::new(&self.config.ffmpeg_bin)
            .args(["-hide_banner", "-loglevel", "error"])
            .args(["-f", "video4linux2"])
            .args(["-video_size", &format!("{}x{}", width, height)])
            .args(["-i", path])
            .args(["-pix_fmt", "rgb24", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CameraError::Unavailable(format!(
                    "failed to start {}: {}",
                    self.config.ffmpeg_bin, e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::Stream("ffmpeg stdout not captured".to_string()))?;

        let (tx, rx) = watch::channel(None);
        let reader = tokio::spawn(read_frames(stdout, width, height, tx));

        let mut stream = FfmpegStream {
            child,
            reader,
            frames: rx,
            frame_timeout: self.config.frame_timeout,
            stopped: false,
        };

        // ffmpeg only fails on permission or busy devices once it reads; wait for
        // the first frame so those surface as an open failure.
        if let Err(e) = stream.current_frame().await {
            stream.stop();
            return Err(CameraError::Unavailable(format!("{}: {}", path, e)));
        }

        tracing::info!("Camera opened: {} ({}x{})", path, width, height);

        Ok(stream)
    }
}

async fn read_frames(
    mut stdout: ChildStdout,
    width: u32,
    height: u32,
    tx: watch::Sender<LatestFrame>,
) {
    let frame_len = width as usize * height as usize * 3;
    if frame_len == 0 {
        tracing::error!("Camera stream has no pixels ({}x{})", width, height);
        return;
    }

    loop {
        let mut data = vec![0u8; frame_len];
        if let Err(e) = stdout.read_exact(&mut data).await {
            tracing::debug!("Camera stream ended: {}", e);
            break;
        }

        let frame = Frame {
            width,
            height,
            data,
        };
        if tx.send(Some(Arc::new(frame))).is_err() {
            break;
        }
    }
}

struct FfmpegStream {
    child: Child,
    reader: JoinHandle<()>,
    frames: watch::Receiver<LatestFrame>,
    frame_timeout: Duration,
    stopped: bool,
}

#[async_trait]
impl VideoStream for FfmpegStream {
    async fn current_frame(&mut self) -> Result<Frame, CameraError> {
        if self.stopped {
            return Err(CameraError::NotOpen);
        }

        let latest = {
            let waited = tokio::time::timeout(
                self.frame_timeout,
                self.frames.wait_for(|frame| frame.is_some()),
            )
            .await
            .map_err(|_| CameraError::NoFrame)?;

            match waited {
                Ok(frame) => (*frame).clone(),
                Err(_) => return Err(CameraError::Stream("camera stream ended".to_string())),
            }
        };

        latest
            .map(|frame| frame.as_ref().clone())
            .ok_or(CameraError::NoFrame)
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.reader.abort();
        if let Err(e) = self.child.start_kill() {
            tracing::debug!("ffmpeg already exited: {}", e);
        }
        tracing::info!("Camera stream stopped");
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::os::unix::process::ExitStatusExt;
    use std::path::PathBuf;

    fn config() -> CameraConfig {
        CameraConfig {
            environment_device: "/dev/does-not-exist-video0".to_string(),
            user_device: None,
            width: 640,
            height: 480,
            ffmpeg_bin: "ffmpeg".to_string(),
            jpeg_quality: 85,
            frame_timeout: Duration::from_secs(1),
        }
    }

    /// Stand-in for ffmpeg: ignores its arguments and runs `body`
    struct FakeFfmpeg {
        path: PathBuf,
    }

    impl FakeFfmpeg {
        fn new(body: &str) -> Self {
            let path = std::env::temp_dir().join(format!("fake-ffmpeg-{}.sh", uuid::Uuid::now_v7()));
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            Self { path }
        }

        fn device(&self, width: u32, height: u32, frame_timeout: Duration) -> V4l2FfmpegDevice {
            V4l2FfmpegDevice::new(CameraConfig {
                environment_device: "/dev/null".to_string(),
                width,
                height,
                ffmpeg_bin: self.path.to_string_lossy().into_owned(),
                frame_timeout,
                ..config()
            })
        }
    }

    impl Drop for FakeFfmpeg {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    /// True once the process is gone or only a zombie is left
    fn process_ended(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .map(|rest| rest.trim_start().starts_with('Z'))
                .unwrap_or(true),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_missing_device_is_unavailable() {
        let device = V4l2FfmpegDevice::new(config());

        let result = device.open(FacingMode::Environment).await;
        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_user_camera_is_unavailable() {
        let device = V4l2FfmpegDevice::new(config());

        let result = device.open(FacingMode::User).await;
        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_open_yields_frames_at_native_resolution() {
        let ffmpeg = FakeFfmpeg::new("exec cat /dev/zero");
        let device = ffmpeg.device(4, 3, Duration::from_secs(5));

        let mut stream = device.open(FacingMode::Environment).await.unwrap();
        let frame = stream.current_frame().await.unwrap();

        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(frame.data.len(), 4 * 3 * 3);
        stream.stop();
    }

    #[tokio::test]
    async fn test_stream_publishes_newest_frame() {
        let ffmpeg = FakeFfmpeg::new("printf 'AAAAAA'; printf 'BBBBBB'; exec sleep 30");
        let device = ffmpeg.device(2, 1, Duration::from_secs(5));
        let mut stream = device.start("/dev/null").await.unwrap();

        let newest = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let frame = stream.current_frame().await.unwrap();
                if frame.data == b"BBBBBB" {
                    return frame;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!((newest.width, newest.height), (2, 1));
        assert_eq!(stream.frames.borrow().as_ref().unwrap().data, b"BBBBBB");
    }

    #[tokio::test]
    async fn test_stop_kills_ffmpeg_and_reader() {
        let ffmpeg = FakeFfmpeg::new("exec cat /dev/zero");
        let device = ffmpeg.device(4, 3, Duration::from_secs(5));
        let mut stream = device.start("/dev/null").await.unwrap();

        stream.stop();
        stream.stop();

        let status = tokio::time::timeout(Duration::from_secs(5), stream.child.wait())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.signal(), Some(9));
        tokio::time::timeout(Duration::from_secs(5), &mut stream.reader)
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            stream.current_frame().await,
            Err(CameraError::NotOpen)
        ));
    }

    #[tokio::test]
    async fn test_drop_releases_camera() {
        let ffmpeg = FakeFfmpeg::new("exec cat /dev/zero");
        let device = ffmpeg.device(4, 3, Duration::from_secs(5));
        let stream = device.start("/dev/null").await.unwrap();
        let pid = stream.child.id().unwrap();

        drop(stream);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !process_ended(pid) {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_ffmpeg_exiting_without_frames_is_unavailable() {
        let ffmpeg = FakeFfmpeg::new("exit 1");
        let frame_timeout = Duration::from_secs(2);
        let device = ffmpeg.device(4, 3, frame_timeout);

        let result = tokio::time::timeout(frame_timeout, device.open(FacingMode::Environment))
            .await
            .unwrap();

        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_silent_ffmpeg_times_out_as_unavailable() {
        let ffmpeg = FakeFfmpeg::new("exec sleep 30");
        let device = ffmpeg.device(4, 3, Duration::from_millis(200));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            device.open(FacingMode::Environment),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_zero_sized_stream_fails_instead_of_spinning() {
        let ffmpeg = FakeFfmpeg::new("exec cat /dev/zero");
        let device = ffmpeg.device(0, 480, Duration::from_secs(2));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            device.open(FacingMode::Environment),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }
}
