//! Report form session: draft, camera and the submission workflow.
//!
//! One form session lives for the lifetime of the service. Lock order is
//! always `form` then `camera`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

use crate::core::error::{AppError, Result};
use crate::features::reports::clients::ReportBackend;
use crate::features::reports::dtos::{DraftResponseDto, ReportFormResponseDto, UpdateDraftDto};
use crate::features::reports::models::{ReportDraft, ReportLocation, SubmissionState};
use crate::features::reports::services::report_assembler;
use crate::features::reports::services::ReverseGeocoder;
use crate::modules::camera::{CameraSession, CameraState, CaptureDevice, Photo};
use crate::modules::location::LocationAcquirer;
use crate::shared::constants::{MSG_SUBMIT_FAILED, MSG_SUBMIT_SUCCEEDED};

/// Longest a shutdown waits for an in-flight submission to settle
const SUBMISSION_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

struct FormSession {
    draft: ReportDraft,
    state: SubmissionState,
}

impl FormSession {
    fn new() -> Self {
        Self {
            draft: ReportDraft::default(),
            state: SubmissionState::Editing,
        }
    }

    fn ensure_not_submitting(&self) -> Result<()> {
        if self.state.is_submitting() {
            return Err(AppError::Conflict(
                "A report is currently being submitted".to_string(),
            ));
        }
        Ok(())
    }

    /// The user is interacting again; a shown outcome goes away
    fn resume_editing(&mut self) {
        if self.state.is_settled() {
            self.state = SubmissionState::Editing;
        }
    }

    fn to_dto(&self, camera: CameraState) -> ReportFormResponseDto {
        let message = match &self.state {
            SubmissionState::Succeeded => Some(MSG_SUBMIT_SUCCEEDED.to_string()),
            SubmissionState::Failed { message } => Some(message.clone()),
            _ => None,
        };

        ReportFormResponseDto {
            draft: DraftResponseDto::from(&self.draft),
            camera,
            submission: self.state.clone(),
            message,
            can_submit: !self.state.is_submitting(),
        }
    }
}

/// Drives location, reverse geocoding, payload assembly and the backend call
/// for the single report form, and owns its visible state.
pub struct ReportFormService {
    form: Mutex<FormSession>,
    camera: Mutex<CameraSession>,
    location: LocationAcquirer,
    location_timeout: Duration,
    geocoder: Arc<dyn ReverseGeocoder>,
    backend: Arc<dyn ReportBackend>,
    settled: Notify,
}

impl ReportFormService {
    pub fn new(
        camera_device: Arc<dyn CaptureDevice>,
        jpeg_quality: u8,
        location: LocationAcquirer,
        location_timeout: Duration,
        geocoder: Arc<dyn ReverseGeocoder>,
        backend: Arc<dyn ReportBackend>,
    ) -> Self {
        Self {
            form: Mutex::new(FormSession::new()),
            camera: Mutex::new(CameraSession::new(camera_device, jpeg_quality)),
            location,
            location_timeout,
            geocoder,
            backend,
            settled: Notify::new(),
        }
    }

    pub async fn snapshot(&self) -> ReportFormResponseDto {
        let form = self.form.lock().await;
        let camera = self.camera.lock().await;
        form.to_dto(camera.state())
    }

    /// Applies the provided fields to the draft
    pub async fn update_draft(&self, dto: UpdateDraftDto) -> Result<ReportFormResponseDto> {
        let mut form = self.form.lock().await;
        form.ensure_not_submitting()?;

        dto.apply_to(&mut form.draft);
        form.resume_editing();

        let camera = self.camera.lock().await;
        Ok(form.to_dto(camera.state()))
    }

    /// Dismisses a shown success or failure
    pub async fn acknowledge(&self) -> Result<ReportFormResponseDto> {
        let mut form = self.form.lock().await;
        form.ensure_not_submitting()?;
        form.resume_editing();

        let camera = self.camera.lock().await;
        Ok(form.to_dto(camera.state()))
    }

    /// Tears the form session down: camera released, draft and state reset
    pub async fn discard(&self) -> Result<ReportFormResponseDto> {
        let mut form = self.form.lock().await;
        form.ensure_not_submitting()?;
        *form = FormSession::new();

        let mut camera = self.camera.lock().await;
        camera.close();
        tracing::info!("Report form discarded");
        Ok(form.to_dto(camera.state()))
    }

    pub async fn open_camera(&self) -> Result<ReportFormResponseDto> {
        let mut camera = self.camera.lock().await;
        camera.open().await?;
        drop(camera);

        Ok(self.snapshot().await)
    }

    pub async fn preview(&self) -> Result<Photo> {
        let mut camera = self.camera.lock().await;
        Ok(camera.preview().await?)
    }

    /// Captures a still and attaches it to the draft, replacing any earlier photo
    pub async fn capture_photo(&self) -> Result<ReportFormResponseDto> {
        let mut form = self.form.lock().await;
        form.ensure_not_submitting()?;

        let mut camera = self.camera.lock().await;
        let photo = camera.capture().await?;
        form.draft.photo = Some(photo);
        form.resume_editing();

        Ok(form.to_dto(camera.state()))
    }

    pub async fn close_camera(&self) -> ReportFormResponseDto {
        let form = self.form.lock().await;
        let mut camera = self.camera.lock().await;
        camera.close();
        form.to_dto(camera.state())
    }

    pub async fn photo(&self) -> Result<Photo> {
        let form = self.form.lock().await;
        form.draft
            .photo
            .clone()
            .ok_or_else(|| AppError::NotFound("No photo attached".to_string()))
    }

    /// Runs the submission workflow to completion.
    ///
    /// The workflow runs on its own task so a disconnecting caller cannot
    /// strand the form in `Submitting`.
    pub async fn submit(self: Arc<Self>) -> Result<ReportFormResponseDto> {
        let draft = self.begin_submission().await?;

        let service = Arc::clone(&self);
        let workflow = tokio::spawn(async move { service.run_submission(draft).await });

        if let Err(e) = workflow.await {
            tracing::error!("Submission task failed: {}", e);
            let mut form = self.form.lock().await;
            form.state = SubmissionState::Failed {
                message: MSG_SUBMIT_FAILED.to_string(),
            };
            drop(form);
            self.settled.notify_waiters();
        }

        Ok(self.snapshot().await)
    }

    /// Lets an in-flight submission settle, then releases the camera
    pub async fn shutdown(&self) {
        if tokio::time::timeout(SUBMISSION_DRAIN_TIMEOUT, self.wait_until_settled())
            .await
            .is_err()
        {
            tracing::warn!(
                "Report still submitting after {:?}; abandoning it",
                SUBMISSION_DRAIN_TIMEOUT
            );
        }
        self.camera.lock().await.close();
    }

    async fn wait_until_settled(&self) {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.form.lock().await.state.is_submitting() {
                return;
            }
            tracing::info!("Waiting for in-flight report submission");
            notified.await;
        }
    }

    async fn begin_submission(&self) -> Result<ReportDraft> {
        let mut form = self.form.lock().await;
        form.ensure_not_submitting()?;

        let missing = form.draft.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Required fields are empty: {}",
                missing.join(", ")
            )));
        }

        form.state = SubmissionState::Submitting;
        Ok(form.draft.clone())
    }

    async fn run_submission(&self, mut draft: ReportDraft) {
        tracing::info!(
            "Submitting report '{}' (category: {}, photo: {})",
            draft.title,
            draft.category,
            draft.photo.is_some()
        );

        draft.location = self.locate().await;
        let payload = report_assembler::build(&draft);
        let result = self.backend.create(payload).await;

        let mut form = self.form.lock().await;
        match result {
            Ok(()) => {
                tracing::info!("Report submitted");
                form.draft = ReportDraft::default();
                form.state = SubmissionState::Succeeded;
            }
            Err(e) => {
                tracing::error!("Report submission failed: {}", e);
                form.state = SubmissionState::Failed {
                    message: MSG_SUBMIT_FAILED.to_string(),
                };
            }
        }
        drop(form);
        self.settled.notify_waiters();
    }

    /// Coordinate plus best-effort address; `None` when no fix was obtained
    async fn locate(&self) -> Option<ReportLocation> {
        let coordinate = match self.location.acquire(self.location_timeout).await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                tracing::warn!("Submitting without location: {}", e);
                return None;
            }
        };

        let address = self
            .geocoder
            .resolve(coordinate)
            .await
            .map(|response| response.best_address())
            .filter(|address| !address.is_empty());

        if address.is_none() {
            tracing::warn!(
                "No address found for {}, {}",
                coordinate.latitude,
                coordinate.longitude
            );
        }

        Some(ReportLocation {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            address,
        })
    }
}
