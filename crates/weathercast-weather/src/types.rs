use serde::{Deserialize, Serialize};

/// Upstream timestamps carrying this marker are treated as the day's sample.
pub const MIDDAY_MARKER: &str = "12:00:00";

/// Maximum number of daily entries kept from the 5-day forecast.
pub const MAX_FORECAST_ENTRIES: usize = 5;

/// Country assumed when the geocoder cannot place a postal code.
pub const DEFAULT_COUNTRY_CODE: &str = "us";

/// Generic text shown to users whenever a fetch fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data";

/// Current conditions plus a short daily forecast for one postal code.
///
/// Scalar fields are optional because the upstream payload may omit them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_name: Option<String>,
    pub temperature_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub temp_min_c: Option<f64>,
    pub condition: Option<String>,
    #[serde(default)]
    pub forecast: Vec<ForecastEntry>,
}

/// One daily forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Upstream timestamp, e.g. "2024-01-02 12:00:00"
    pub date: String,
    pub temp_c: f64,
    pub condition: String,
}

/// Why a fetch produced no weather record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No API key configured; nothing was sent upstream.
    #[error("Missing API key")]
    MissingApiKey,

    /// Current-conditions endpoint answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    /// Transport failure or a payload that could not be read.
    #[error("Error fetching weather data: {0}")]
    Transport(String),
}

impl FetchError {
    /// Message safe to show to end users. The specific diagnostic is only logged.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

/// Result of a fetch: either a full record or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    Success(WeatherRecord),
    Failure(FetchError),
}

impl WeatherOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            Self::Success(record) => Some(record),
            Self::Failure(_) => None,
        }
    }

    pub fn into_record(self) -> Option<WeatherRecord> {
        match self {
            Self::Success(record) => Some(record),
            Self::Failure(_) => None,
        }
    }

    /// Diagnostic text of a failure, `None` on success.
    pub fn error(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e.to_string()),
        }
    }
}

impl From<FetchError> for WeatherOutcome {
    fn from(e: FetchError) -> Self {
        Self::Failure(e)
    }
}
