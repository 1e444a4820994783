use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Report category; values are sent to the backend verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum ReportCategory {
    Infrastruktur,
    Keamanan,
    Kesehatan,
    Kebersihan,
    Sosial,
    Bencana,
    #[default]
    Lainnya,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 7] = [
        ReportCategory::Infrastruktur,
        ReportCategory::Keamanan,
        ReportCategory::Kesehatan,
        ReportCategory::Kebersihan,
        ReportCategory::Sosial,
        ReportCategory::Bencana,
        ReportCategory::Lainnya,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Infrastruktur => "Infrastruktur",
            ReportCategory::Keamanan => "Keamanan",
            ReportCategory::Kesehatan => "Kesehatan",
            ReportCategory::Kebersihan => "Kebersihan",
            ReportCategory::Sosial => "Sosial",
            ReportCategory::Bencana => "Bencana",
            ReportCategory::Lainnya => "Lainnya",
        }
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown report category: {}", s))
    }
}
