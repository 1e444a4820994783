use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::Name;
use fake::Fake;
use tokio::sync::Notify;

use crate::features::reports::clients::{BackendError, ReportBackend};
use crate::features::reports::dtos::UpdateDraftDto;
use crate::features::reports::models::{ReportCategory, ReportDraft};
use crate::features::reports::services::report_assembler::FIELD_IMAGE;
use crate::features::reports::services::{
    NominatimAddress, NominatimReverseResponse, ReportPayload, ReverseGeocoder,
};
use crate::modules::camera::{
    encode_jpeg, CameraError, CaptureDevice, FacingMode, Frame, Photo, VideoStream,
};
use crate::modules::location::{Coordinate, LocationError, PositionOptions, PositionSource};

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CameraCounters {
    opened: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
    stops: AtomicUsize,
}

#[derive(Clone, Copy, PartialEq)]
enum CameraBehavior {
    Working,
    Unavailable,
    BrokenFrames,
}

/// In-memory camera that counts how many streams it has handed out and how
/// many are still live. Each stream produces a different solid shade.
pub struct FakeCamera {
    width: u32,
    height: u32,
    behavior: CameraBehavior,
    counters: Arc<CameraCounters>,
}

impl FakeCamera {
    fn with_behavior(width: u32, height: u32, behavior: CameraBehavior) -> Arc<Self> {
        Arc::new(Self {
            width,
            height,
            behavior,
            counters: Arc::new(CameraCounters::default()),
        })
    }

    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Self::with_behavior(width, height, CameraBehavior::Working)
    }

    pub fn unavailable() -> Arc<Self> {
        Self::with_behavior(32, 24, CameraBehavior::Unavailable)
    }

    /// Opens fine but every frame is too short to encode
    pub fn with_broken_frames() -> Arc<Self> {
        Self::with_behavior(32, 24, CameraBehavior::BrokenFrames)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.counters.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureDevice for FakeCamera {
    async fn open(&self, _facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError> {
        if self.behavior == CameraBehavior::Unavailable {
            return Err(CameraError::Unavailable("Permission denied".to_string()));
        }

        let opened = self.counters.opened.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(FakeStream {
            width: self.width,
            height: self.height,
            shade: (opened * 60 % 256) as u8,
            broken: self.behavior == CameraBehavior::BrokenFrames,
            stopped: false,
            counters: self.counters.clone(),
        }))
    }
}

struct FakeStream {
    width: u32,
    height: u32,
    shade: u8,
    broken: bool,
    stopped: bool,
    counters: Arc<CameraCounters>,
}

#[async_trait]
impl VideoStream for FakeStream {
    async fn current_frame(&mut self) -> Result<Frame, CameraError> {
        if self.stopped {
            return Err(CameraError::Stream("stream stopped".to_string()));
        }

        let len = if self.broken {
            3
        } else {
            (self.width * self.height * 3) as usize
        };

        Ok(Frame {
            width: self.width,
            height: self.height,
            data: vec![self.shade; len],
        })
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
            self.counters.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Small deterministic JPEG filled with `shade`
pub fn sample_photo(shade: u8) -> Photo {
    encode_jpeg(
        Frame {
            width: 16,
            height: 12,
            data: vec![shade; 16 * 12 * 3],
        },
        85,
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A receiver that never gets a fix
pub struct NeverPositionSource;

#[async_trait]
impl PositionSource for NeverPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        std::future::pending().await
    }
}

/// Answers immediately and remembers what it was asked
pub struct RecordingPositionSource {
    coordinate: Option<Coordinate>,
    last_options: Mutex<Option<PositionOptions>>,
    calls: AtomicUsize,
}

impl RecordingPositionSource {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinate: Some(Coordinate {
                latitude,
                longitude,
            }),
            last_options: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self {
            coordinate: None,
            last_options: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn last_options(&self) -> Option<PositionOptions> {
        *self.last_options.lock().unwrap()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionSource for RecordingPositionSource {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(*options);
        self.coordinate
            .ok_or_else(|| LocationError::PermissionDenied("User denied Geolocation".to_string()))
    }
}

/// Geocoder with a canned answer
pub struct FakeGeocoder {
    response: Option<NominatimReverseResponse>,
}

impl FakeGeocoder {
    pub fn returning(response: NominatimReverseResponse) -> Self {
        Self {
            response: Some(response),
        }
    }

    pub fn road(road: &str) -> Self {
        Self::returning(NominatimReverseResponse {
            address: Some(NominatimAddress {
                road: Some(road.to_string()),
                ..Default::default()
            }),
            display_name: None,
        })
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn resolve(&self, _coordinate: Coordinate) -> Option<NominatimReverseResponse> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Report drafts
// ---------------------------------------------------------------------------

/// A fully filled-in draft with no photo and no location
pub fn fake_draft() -> ReportDraft {
    ReportDraft {
        name: Name().fake(),
        phone: format!("0812{:08}", (0..99_999_999u32).fake::<u32>()),
        dusun: format!("Dusun {}", (1..6u8).fake::<u8>()),
        rt: format!("{:03}", (1..20u16).fake::<u16>()),
        title: Sentence(3..6).fake(),
        description: Paragraph(1..3).fake(),
        category: ReportCategory::Lainnya,
        photo: None,
        location: None,
    }
}

/// Update that fills every text field of the form
pub fn fake_update() -> UpdateDraftDto {
    let draft = fake_draft();
    UpdateDraftDto {
        name: Some(draft.name),
        phone: Some(draft.phone),
        dusun: Some(draft.dusun),
        rt: Some(draft.rt),
        title: Some(draft.title),
        description: Some(draft.description),
        category: Some(draft.category),
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Backend that keeps every payload it receives.
///
/// A gated backend parks each call until `release` is called.
pub struct RecordingBackend {
    payloads: Mutex<Vec<ReportPayload>>,
    failure: Mutex<Option<u16>>,
    gated: bool,
    called: Notify,
    released: Notify,
}

impl RecordingBackend {
    fn build(failure: Option<u16>, gated: bool) -> Self {
        Self {
            payloads: Mutex::new(Vec::new()),
            failure: Mutex::new(failure),
            gated,
            called: Notify::new(),
            released: Notify::new(),
        }
    }

    pub fn succeeding() -> Self {
        Self::build(None, false)
    }

    pub fn failing_with(status: u16) -> Self {
        Self::build(Some(status), false)
    }

    pub fn gated() -> Self {
        Self::build(None, true)
    }

    pub fn set_failure(&self, status: Option<u16>) {
        *self.failure.lock().unwrap() = status;
    }

    pub fn payloads(&self) -> Vec<ReportPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    pub async fn wait_until_called(&self) {
        self.called.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl ReportBackend for RecordingBackend {
    async fn create(&self, payload: ReportPayload) -> Result<(), BackendError> {
        self.payloads.lock().unwrap().push(payload);
        self.called.notify_one();

        if self.gated {
            self.released.notified().await;
        }

        let failure = *self.failure.lock().unwrap();
        match failure {
            Some(status) => Err(BackendError::Status {
                status,
                body: "Internal Server Error".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A file part received by [`FakeReportServer`]
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// One multipart body received by [`FakeReportServer`]
#[derive(Debug, Clone, Default)]
pub struct ReceivedReport {
    pub fields: Vec<(String, String)>,
    pub image: Option<ReceivedFile>,
}

impl ReceivedReport {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

struct FakeReportServerState {
    status: AtomicU16,
    received: tokio::sync::Mutex<Vec<ReceivedReport>>,
}

/// Village backend stand-in that accepts `POST /reports` on a random local port
pub struct FakeReportServer {
    base_url: String,
    state: Arc<FakeReportServerState>,
}

impl FakeReportServer {
    pub async fn start(status: u16) -> Self {
        let state = Arc::new(FakeReportServerState {
            status: AtomicU16::new(status),
            received: tokio::sync::Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/reports", post(receive_report))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", address),
            state,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn set_status(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    pub async fn received(&self) -> Vec<ReceivedReport> {
        self.state.received.lock().await.clone()
    }
}

async fn receive_report(
    State(state): State<Arc<FakeReportServerState>>,
    mut multipart: Multipart,
) -> StatusCode {
    let mut report = ReceivedReport::default();

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == FIELD_IMAGE {
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(String::from);
            let bytes = field.bytes().await.unwrap().to_vec();
            report.image = Some(ReceivedFile {
                file_name,
                content_type,
                bytes,
            });
        } else {
            report.fields.push((name, field.text().await.unwrap()));
        }
    }

    state.received.lock().await.push(report);
    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap()
}
