use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::config::BackendConfig;
use crate::features::village_data::dtos::VillageDataResponseDto;
use crate::shared::constants::MSG_DIRECTORY_FETCH_FAILED;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid list from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Default)]
struct Directory {
    aparatur: Vec<Value>,
    activities: Vec<Value>,
    events: Vec<Value>,
    loading: bool,
    error: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Directory {
    fn to_dto(&self) -> VillageDataResponseDto {
        VillageDataResponseDto {
            aparatur: self.aparatur.clone(),
            activities: self.activities.clone(),
            events: self.events.clone(),
            loading: self.loading,
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

/// Cached copy of the village directory lists
pub struct VillageDataService {
    client: reqwest::Client,
    base_url: String,
    directory: RwLock<Directory>,
}

impl VillageDataService {
    pub fn new(config: &BackendConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(config.timeout).build()?,
            base_url: config.base_url.clone(),
            directory: RwLock::new(Directory::default()),
        })
    }

    pub async fn snapshot(&self) -> VillageDataResponseDto {
        self.directory.read().await.to_dto()
    }

    /// Fetches all three lists concurrently and replaces the cache only if
    /// every fetch succeeded. A refresh already in flight is not repeated.
    pub async fn refresh(&self) -> VillageDataResponseDto {
        {
            let mut directory = self.directory.write().await;
            if directory.loading {
                tracing::debug!("Village directory refresh already in progress");
                return directory.to_dto();
            }
            directory.loading = true;
        }

        let result = futures::try_join!(
            self.fetch_list("aparatur"),
            self.fetch_list("activities"),
            self.fetch_list("events"),
        );

        let mut directory = self.directory.write().await;
        match result {
            Ok((aparatur, activities, events)) => {
                tracing::info!(
                    "Village directory refreshed: {} aparatur, {} activities, {} events",
                    aparatur.len(),
                    activities.len(),
                    events.len()
                );
                directory.aparatur = aparatur;
                directory.activities = activities;
                directory.events = events;
                directory.error = None;
                directory.fetched_at = Some(Utc::now());
            }
            Err(e) => {
                tracing::error!("Failed to refresh village directory: {}", e);
                directory.error = Some(MSG_DIRECTORY_FETCH_FAILED.to_string());
            }
        }
        directory.loading = false;

        directory.to_dto()
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Value>, DirectoryError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DirectoryError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| DirectoryError::Decode {
                url,
                message: e.to_string(),
            })
    }
}
