//! Address form submissions: validate, geocode, fetch.

use std::sync::Arc;
use weathercast_weather::{postal_code_for, Geocoder, WeatherFetcher, WeatherOutcome};

pub const BLANK_ADDRESS_NOTICE: &str = "Address cannot be blank.";
pub const INVALID_ADDRESS_NOTICE: &str = "Invalid address. Please try again.";

/// What a weather page for one address shows.
///
/// A failed `outcome` keeps its specific error; pages only show its
/// `user_message()`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub address: String,
    pub postal_code: String,
    pub outcome: WeatherOutcome,
    pub from_cache: bool,
}

impl WeatherView {
    /// Text shown to users for a failed fetch, `None` on success.
    pub fn user_error(&self) -> Option<&'static str> {
        match &self.outcome {
            WeatherOutcome::Success(_) => None,
            WeatherOutcome::Failure(e) => Some(e.user_message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse {
    /// Back to `to` with a one-line notice.
    Redirect { to: String, notice: String },
    Render(WeatherView),
}

impl HandlerResponse {
    fn redirect_home(notice: &str) -> Self {
        Self::Redirect {
            to: "/".to_string(),
            notice: notice.to_string(),
        }
    }
}

pub struct RequestHandler {
    geocoder: Arc<dyn Geocoder>,
    fetcher: Arc<WeatherFetcher>,
}

impl RequestHandler {
    pub fn new(geocoder: Arc<dyn Geocoder>, fetcher: Arc<WeatherFetcher>) -> Self {
        Self { geocoder, fetcher }
    }

    pub async fn handle(&self, address: Option<&str>) -> HandlerResponse {
        let address = address.map(str::trim).unwrap_or_default();
        if address.is_empty() {
            return HandlerResponse::redirect_home(BLANK_ADDRESS_NOTICE);
        }

        let Some(postal_code) = postal_code_for(self.geocoder.as_ref(), address).await else {
            tracing::info!("No postal code for {:?}", address);
            return HandlerResponse::redirect_home(INVALID_ADDRESS_NOTICE);
        };

        let (outcome, from_cache) = self.fetcher.fetch(&postal_code).await;

        HandlerResponse::Render(WeatherView {
            address: address.to_string(),
            postal_code,
            outcome,
            from_cache,
        })
    }
}
