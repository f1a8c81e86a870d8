use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use weathercast_core::{Config, ConfigError, EnvCredentials, API_KEY_CREDENTIAL};
use weathercast_weather::{
    refresh_channel, FetcherSettings, Geocoder, MemoryCache, NominatimGeocoder, WeatherFetcher,
    WeatherProvider,
};
use weathercast_web::RequestHandler;

#[tokio::main]
async fn main() -> Result<()> {
    weathercast_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!("Weathercast starting");

    let settings = FetcherSettings::from_config(&config.weather, &EnvCredentials);
    if settings.api_key.is_none() {
        let missing = ConfigError::MissingSetting(API_KEY_CREDENTIAL.to_string());
        tracing::warn!("{} ({})", missing, missing.user_message());
    }

    let timeout = Duration::from_secs(config.weather.request_timeout_secs);

    let geocoder: Arc<dyn Geocoder> = Arc::new(
        NominatimGeocoder::new(&config.geocoder, timeout)
            .context("Failed to create geocoder client")?,
    );
    let provider = WeatherProvider::new(&config.weather.api_base_url, timeout)
        .context("Failed to create weather client")?;
    let cache = Arc::new(MemoryCache::new());

    let fetcher = Arc::new(WeatherFetcher::new(
        provider,
        geocoder.clone(),
        cache,
        settings,
    ));

    let (queue, worker) = refresh_channel(fetcher.clone());
    let worker = worker.spawn();
    for postal_code in &config.refresh.warm_postal_codes {
        queue.submit(postal_code.as_str());
    }

    let handler = Arc::new(RequestHandler::new(geocoder, fetcher));
    weathercast_web::serve(handler, &config.server).await?;

    drop(queue);
    let refreshed = worker.await.context("Refresh worker panicked")?;
    tracing::info!("Shut down after {} background refreshes", refreshed);

    Ok(())
}
