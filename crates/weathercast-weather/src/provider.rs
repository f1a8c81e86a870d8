//! OpenWeatherMap client: current conditions and the 5-day/3-hour forecast.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use weathercast_core::{NetworkError, ReqwestErrorExt};

const UNITS: &str = "metric";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Non-success status; `message` is the API's own explanation when present.
    #[error("Upstream returned {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub name: Option<String>,
    pub main: Option<CurrentMain>,
    #[serde(default)]
    pub weather: Vec<ConditionDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentMain {
    pub temp: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDescription {
    pub description: String,
}

impl CurrentConditions {
    /// First condition description, as the API lists the primary one first.
    pub fn primary_condition(&self) -> Option<&str> {
        self.weather.first().map(|w| w.description.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastSample>,
}

/// One 3-hour forecast point.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSample {
    /// "YYYY-MM-DD HH:MM:SS", UTC
    pub dt_txt: String,
    pub main: SampleMain,
    #[serde(default)]
    pub weather: Vec<ConditionDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions for a postal code.
    pub async fn current(
        &self,
        postal_code: &str,
        country_code: &str,
        api_key: &str,
    ) -> Result<CurrentConditions, ProviderError> {
        let response = self
            .get("weather", postal_code, country_code, api_key)
            .await?;
        Self::handle_response(response).await
    }

    /// 5-day forecast in 3-hour steps for a postal code.
    pub async fn forecast(
        &self,
        postal_code: &str,
        country_code: &str,
        api_key: &str,
    ) -> Result<Vec<ForecastSample>, ProviderError> {
        let response = self
            .get("forecast", postal_code, country_code, api_key)
            .await?;
        let body: ForecastResponse = Self::handle_response(response).await?;
        Ok(body.list)
    }

    async fn get(
        &self,
        endpoint: &str,
        postal_code: &str,
        country_code: &str,
        api_key: &str,
    ) -> Result<Response, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let zip = format!("{},{}", postal_code, country_code);
        tracing::debug!("GET {} zip={}", url, zip);

        let response = self
            .client
            .get(&url)
            .query(&[("zip", zip.as_str()), ("units", UNITS), ("appid", api_key)])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        tracing::debug!("{} answered {}", endpoint, response.status());
        Ok(response)
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| e.into_network_error())?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))
        } else {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.trim().is_empty());
            Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}
