use utoipa::{Modify, OpenApi};

use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::village_data::{dtos as village_dtos, handlers as village_handlers};
use crate::modules::camera::CameraState;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Report form
        reports_handlers::report_form_handler::get_report_form,
        reports_handlers::report_form_handler::update_draft,
        reports_handlers::report_form_handler::acknowledge,
        reports_handlers::report_form_handler::submit_report,
        reports_handlers::report_form_handler::discard_report_form,
        reports_handlers::report_form_handler::get_photo,
        // Camera
        reports_handlers::camera_handler::open_camera,
        reports_handlers::camera_handler::preview_frame,
        reports_handlers::camera_handler::capture_photo,
        reports_handlers::camera_handler::close_camera,
        // Village data
        village_handlers::village_data_handler::get_village_data,
        village_handlers::village_data_handler::refresh_village_data,
    ),
    components(
        schemas(
            // Report form
            reports_models::ReportCategory,
            reports_models::SubmissionState,
            CameraState,
            reports_dtos::UpdateDraftDto,
            reports_dtos::DraftResponseDto,
            reports_dtos::ReportFormResponseDto,
            ApiResponse<reports_dtos::ReportFormResponseDto>,
            // Village data
            village_dtos::VillageDataResponseDto,
            ApiResponse<village_dtos::VillageDataResponseDto>,
        )
    ),
    tags(
        (name = "report-form", description = "Citizen report form and submission"),
        (name = "camera", description = "Camera preview and photo capture for the report form"),
        (name = "village-data", description = "Village officials, activities and events (read-only)"),
    ),
    info(
        title = "Desa Pelapor API",
        version = "0.1.0",
        description = "Local API of the village reporting terminal",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
