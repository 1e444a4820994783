use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reports::models::{ReportCategory, ReportDraft, SubmissionState};
use crate::modules::camera::CameraState;

/// Request DTO for editing the report form. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDraftDto {
    #[validate(length(max = 128, message = "Name must not exceed 128 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(
        length(max = 32, message = "Phone must not exceed 32 characters"),
        regex(
            path = "*crate::shared::validation::PHONE_REGEX",
            message = "Phone may only contain digits, spaces, +, -, ( and )"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[validate(length(max = 64, message = "Dusun must not exceed 64 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dusun: Option<String>,

    #[validate(length(max = 16, message = "RT must not exceed 16 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rt: Option<String>,

    #[validate(length(max = 200, message = "Title must not exceed 200 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ReportCategory>,
}

impl UpdateDraftDto {
    pub fn apply_to(self, draft: &mut ReportDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(dusun) = self.dusun {
            draft.dusun = dusun;
        }
        if let Some(rt) = self.rt {
            draft.rt = rt;
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
    }
}

/// The draft as shown on the form; the photo itself is served separately
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DraftResponseDto {
    pub name: String,
    pub phone: String,
    pub dusun: String,
    pub rt: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub has_photo: bool,
    /// Required fields that are still empty
    pub missing_fields: Vec<String>,
}

impl From<&ReportDraft> for DraftResponseDto {
    fn from(d: &ReportDraft) -> Self {
        Self {
            name: d.name.clone(),
            phone: d.phone.clone(),
            dusun: d.dusun.clone(),
            rt: d.rt.clone(),
            title: d.title.clone(),
            description: d.description.clone(),
            category: d.category,
            has_photo: d.photo.is_some(),
            missing_fields: d.missing_fields().into_iter().map(String::from).collect(),
        }
    }
}

/// Response DTO for the whole report form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportFormResponseDto {
    pub draft: DraftResponseDto,
    pub camera: CameraState,
    pub submission: SubmissionState,
    /// Outcome banner text, present after a submission settles
    pub message: Option<String>,
    /// False while a submission is in flight
    pub can_submit: bool,
}
