use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Visible progress of the report form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionState {
    Editing,
    Submitting,
    Succeeded,
    Failed { message: String },
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }

    /// Whether the last submission outcome is still on screen
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded | SubmissionState::Failed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_tagged_status() {
        let json = serde_json::to_value(SubmissionState::Failed {
            message: "Gagal mengirim laporan".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "failed", "message": "Gagal mengirim laporan"})
        );

        let json = serde_json::to_value(SubmissionState::Submitting).unwrap();
        assert_eq!(json, serde_json::json!({"status": "submitting"}));
    }
}
