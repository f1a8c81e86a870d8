//! Forward geocoding: free text (address or postal code) to postal/country codes.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use weathercast_core::{GeocoderConfig, NetworkError, ReqwestErrorExt};

/// First match of a geocoder search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoMatch {
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2, lower case
    pub country_code: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoder request failed: {0}")]
    Network(#[from] NetworkError),

    #[error("Geocoder returned status {0}")]
    Status(u16),
}

/// Address lookup used by the request handler and the fetcher.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the first match for `query`, or `None` when nothing matches.
    async fn search(&self, query: &str) -> Result<Option<GeoMatch>, GeocodeError>;
}

/// Resolve free text to a postal code. Lookup failures count as "not found".
pub async fn postal_code_for(geocoder: &dyn Geocoder, address: &str) -> Option<String> {
    match geocoder.search(address).await {
        Ok(found) => found
            .and_then(|m| m.postal_code)
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty()),
        Err(e) => {
            tracing::warn!("Geocoding {:?} failed: {}", address, e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    postcode: Option<String>,
    country_code: Option<String>,
}

/// Nominatim search client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Arc<Client>,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GeocodeError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Option<GeoMatch>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&addressdetails=1&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        if !response.status().is_success() {
            tracing::debug!("Geocode returned status {}", response.status());
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| e.into_network_error())?;

        let found = places.into_iter().next().map(|place| {
            let address = place.address;
            GeoMatch {
                postal_code: address.as_ref().and_then(|a| a.postcode.clone()),
                country_code: address
                    .and_then(|a| a.country_code)
                    .map(|c| c.to_lowercase()),
            }
        });

        tracing::debug!("Geocoded {:?} to {:?}", query, found);
        Ok(found)
    }
}
