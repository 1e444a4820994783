use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::GeocodingConfig;
use crate::modules::location::Coordinate;

/// Nominatim reverse lookup response (only the parts we read)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NominatimReverseResponse {
    pub address: Option<NominatimAddress>,
    pub display_name: Option<String>,
}

/// Nominatim address components
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NominatimAddress {
    pub road: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
}

impl NominatimReverseResponse {
    /// Road, falling back to village, suburb, then the full display name.
    /// Empty strings do not count. Returns `""` when nothing is usable.
    pub fn best_address(&self) -> String {
        let address = self.address.as_ref();

        [
            address.and_then(|a| a.road.as_deref()),
            address.and_then(|a| a.village.as_deref()),
            address.and_then(|a| a.suburb.as_deref()),
            self.display_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string()
    }
}

/// Maps a coordinate to an address record. Failures are never surfaced.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn resolve(&self, coordinate: Coordinate) -> Option<NominatimReverseResponse>;
}

/// Reverse geocoding against a Nominatim-compatible server
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .build()?,
            base_url: config.base_url.clone(),
        })
    }

    fn reverse_url(&self, coordinate: Coordinate) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, coordinate.latitude, coordinate.longitude
        )
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodingService {
    async fn resolve(&self, coordinate: Coordinate) -> Option<NominatimReverseResponse> {
        let url = self.reverse_url(coordinate);
        tracing::debug!("Reverse geocoding: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Nominatim request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return None;
        }

        match response.json::<NominatimReverseResponse>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("Failed to parse Nominatim response: {}", e);
                None
            }
        }
    }
}
