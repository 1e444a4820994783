use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::ReportCategory;
use crate::modules::camera::Photo;

/// Where the report was filed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Best-effort postal address; absent when reverse geocoding found nothing
    pub address: Option<String>,
}

/// The in-progress report form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDraft {
    pub name: String,
    pub phone: String,
    pub dusun: String,
    pub rt: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub photo: Option<Photo>,
    pub location: Option<ReportLocation>,
}

impl ReportDraft {
    /// Names of required fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("dusun", &self.dusun),
            ("rt", &self.rt),
            ("title", &self.title),
            ("description", &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}
