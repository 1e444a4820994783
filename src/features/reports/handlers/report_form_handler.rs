use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::reports::dtos::{ReportFormResponseDto, UpdateDraftDto};
use crate::features::reports::services::ReportFormService;
use crate::shared::types::ApiResponse;

/// Get the current report form
#[utoipa::path(
    get,
    path = "/api/report-form",
    responses(
        (status = 200, description = "Current draft, camera and submission state", body = ApiResponse<ReportFormResponseDto>)
    ),
    tag = "report-form"
)]
pub async fn get_report_form(
    State(service): State<Arc<ReportFormService>>,
) -> Json<ApiResponse<ReportFormResponseDto>> {
    Json(ApiResponse::success(Some(service.snapshot().await), None))
}

/// Edit the draft
///
/// Only the provided fields change. Editing after a submission outcome
/// returns the form to `editing`.
#[utoipa::path(
    put,
    path = "/api/report-form/draft",
    request_body = UpdateDraftDto,
    responses(
        (status = 200, description = "Draft updated", body = ApiResponse<ReportFormResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "A submission is in progress")
    ),
    tag = "report-form"
)]
pub async fn update_draft(
    State(service): State<Arc<ReportFormService>>,
    ValidatedJson(dto): ValidatedJson<UpdateDraftDto>,
) -> Result<Json<ApiResponse<ReportFormResponseDto>>> {
    let form = service.update_draft(dto).await?;
    Ok(Json(ApiResponse::success(Some(form), None)))
}

/// Dismiss the success or failure message
#[utoipa::path(
    post,
    path = "/api/report-form/acknowledge",
    responses(
        (status = 200, description = "Form back in editing", body = ApiResponse<ReportFormResponseDto>),
        (status = 409, description = "A submission is in progress")
    ),
    tag = "report-form"
)]
pub async fn acknowledge(
    State(service): State<Arc<ReportFormService>>,
) -> Result<Json<ApiResponse<ReportFormResponseDto>>> {
    let form = service.acknowledge().await?;
    Ok(Json(ApiResponse::success(Some(form), None)))
}

/// Submit the report
///
/// Attaches the current location when one can be obtained within the
/// timeout, then sends the report to the village backend. Responds once the
/// submission has settled; a backend failure is reported in the body with
/// status 200 and the draft kept for another attempt.
#[utoipa::path(
    post,
    path = "/api/report-form/submit",
    responses(
        (status = 200, description = "Submission settled (succeeded or failed)", body = ApiResponse<ReportFormResponseDto>),
        (status = 400, description = "Required fields are empty"),
        (status = 409, description = "A submission is already in progress")
    ),
    tag = "report-form"
)]
pub async fn submit_report(
    State(service): State<Arc<ReportFormService>>,
) -> Result<Json<ApiResponse<ReportFormResponseDto>>> {
    let form = service.submit().await?;
    let message = form.message.clone();
    Ok(Json(ApiResponse::success(Some(form), message)))
}

/// Discard the form
///
/// Releases the camera and resets the draft and submission state.
#[utoipa::path(
    delete,
    path = "/api/report-form",
    responses(
        (status = 200, description = "Form discarded", body = ApiResponse<ReportFormResponseDto>),
        (status = 409, description = "A submission is in progress")
    ),
    tag = "report-form"
)]
pub async fn discard_report_form(
    State(service): State<Arc<ReportFormService>>,
) -> Result<Json<ApiResponse<ReportFormResponseDto>>> {
    let form = service.discard().await?;
    Ok(Json(ApiResponse::success(Some(form), None)))
}

/// Get the photo attached to the draft
#[utoipa::path(
    get,
    path = "/api/report-form/photo",
    responses(
        (status = 200, description = "Attached photo (image/jpeg)"),
        (status = 404, description = "No photo attached")
    ),
    tag = "report-form"
)]
pub async fn get_photo(State(service): State<Arc<ReportFormService>>) -> Result<Response> {
    let photo = service.photo().await?;
    Ok(([(header::CONTENT_TYPE, photo.content_type())], photo.bytes).into_response())
}
