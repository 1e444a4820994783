use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response DTO for the village directory
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VillageDataResponseDto {
    /// Village officials, as returned by the backend
    #[schema(value_type = Vec<Object>)]
    pub aparatur: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    pub activities: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<serde_json::Value>,
    /// True while a fetch is in flight
    pub loading: bool,
    /// Error of the last fetch, cleared by the next successful one
    pub error: Option<String>,
    /// When the lists were last fetched successfully
    pub fetched_at: Option<DateTime<Utc>>,
}
