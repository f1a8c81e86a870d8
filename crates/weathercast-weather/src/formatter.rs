//! Display shaping for a [`WeatherOutcome`].

use crate::types::{ForecastEntry, WeatherOutcome};

const UNKNOWN_LOCATION: &str = "Unknown Location";
const NOT_AVAILABLE: &str = "N/A";
const NO_FORECAST: &str = "No forecast available";

/// Read-only view over an outcome with page-ready strings.
#[derive(Debug, Clone, Copy)]
pub struct WeatherFormatter<'a> {
    outcome: &'a WeatherOutcome,
}

impl<'a> WeatherFormatter<'a> {
    pub fn new(outcome: &'a WeatherOutcome) -> Self {
        Self { outcome }
    }

    pub fn name(&self) -> String {
        self.outcome
            .record()
            .and_then(|r| r.location_name.clone())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }

    pub fn temperature(&self) -> String {
        number_or_na(self.outcome.record().and_then(|r| r.temperature_c))
    }

    pub fn max_temp(&self) -> String {
        number_or_na(self.outcome.record().and_then(|r| r.temp_max_c))
    }

    pub fn min_temp(&self) -> String {
        number_or_na(self.outcome.record().and_then(|r| r.temp_min_c))
    }

    pub fn condition(&self) -> String {
        self.outcome
            .record()
            .and_then(|r| r.condition.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Failure text, empty on success.
    pub fn error(&self) -> String {
        self.outcome.error().unwrap_or_default()
    }

    pub fn has_error(&self) -> bool {
        !self.outcome.is_success()
    }

    pub fn forecast(&self) -> &'a [ForecastEntry] {
        self.outcome
            .record()
            .map(|r| r.forecast.as_slice())
            .unwrap_or_default()
    }

    pub fn formatted_forecast(&self) -> String {
        let entries = self.forecast();
        if entries.is_empty() {
            return NO_FORECAST.to_string();
        }

        entries
            .iter()
            .map(|entry| {
                format!(
                    "{} - {}°C, {}",
                    entry.date,
                    format_number(entry.temp_c),
                    capitalize(&entry.condition)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn number_or_na(value: Option<f64>) -> String {
    value
        .map(format_number)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `22.0` renders as `22`, `21.5` as `21.5`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{FetchError, WeatherRecord};

    fn new_york() -> WeatherOutcome {
        WeatherOutcome::Success(WeatherRecord {
            location_name: Some("New York".into()),
            temperature_c: Some(22.0),
            temp_max_c: Some(25.0),
            temp_min_c: Some(18.5),
            condition: Some("clear sky".into()),
            forecast: vec![
                ForecastEntry {
                    date: "2024-01-02 12:00:00".into(),
                    temp_c: 20.0,
                    condition: "scattered clouds".into(),
                },
                ForecastEntry {
                    date: "2024-01-03 12:00:00".into(),
                    temp_c: 19.5,
                    condition: "LIGHT RAIN".into(),
                },
            ],
        })
    }

    #[test]
    fn test_success_fields() {
        let outcome = new_york();
        let f = WeatherFormatter::new(&outcome);

        assert_eq!(f.name(), "New York");
        assert_eq!(f.temperature(), "22");
        assert_eq!(f.max_temp(), "25");
        assert_eq!(f.min_temp(), "18.5");
        assert_eq!(f.condition(), "clear sky");
        assert_eq!(f.error(), "");
        assert!(!f.has_error());
        assert_eq!(f.forecast().len(), 2);
    }

    #[test]
    fn test_formatted_forecast() {
        let outcome = new_york();
        assert_eq!(
            WeatherFormatter::new(&outcome).formatted_forecast(),
            "2024-01-02 12:00:00 - 20°C, Scattered clouds\n2024-01-03 12:00:00 - 19.5°C, Light rain"
        );
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let outcome = WeatherOutcome::Success(WeatherRecord::default());
        let f = WeatherFormatter::new(&outcome);

        assert_eq!(f.name(), "Unknown Location");
        assert_eq!(f.temperature(), "N/A");
        assert_eq!(f.max_temp(), "N/A");
        assert_eq!(f.min_temp(), "N/A");
        assert_eq!(f.condition(), "N/A");
        assert_eq!(f.formatted_forecast(), "No forecast available");
    }

    #[test]
    fn test_failure_outcome() {
        let outcome: WeatherOutcome = FetchError::Upstream("city not found".into()).into();
        let f = WeatherFormatter::new(&outcome);

        assert!(f.has_error());
        assert_eq!(f.error(), "city not found");
        assert_eq!(f.name(), "Unknown Location");
        assert!(f.forecast().is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(21.25), "21.25");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("overcast CLOUDS"), "Overcast clouds");
    }
}
