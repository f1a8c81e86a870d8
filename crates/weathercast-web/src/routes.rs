//! warp filters and the HTTP server.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};
use weathercast_core::ServerConfig;

use crate::handler::{HandlerResponse, RequestHandler};
use crate::views;

#[derive(Debug, Default, Deserialize)]
struct NoticeQuery {
    notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressParams {
    address: Option<String>,
}

fn with_handler(
    handler: Arc<RequestHandler>,
) -> impl Filter<Extract = (Arc<RequestHandler>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || handler.clone())
}

/// All application routes.
///
/// - `GET /` landing page, optional `notice`
/// - `GET /weather/fetch_weather?address=...`
/// - `POST /fetch_weather` with an urlencoded `address` field
pub fn routes(
    handler: Arc<RequestHandler>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(warp::query::<NoticeQuery>())
        .map(|query: NoticeQuery| {
            warp::reply::html(views::render_index(query.notice.as_deref())).into_response()
        });

    let fetch_by_query = warp::path!("weather" / "fetch_weather")
        .and(warp::get())
        .and(warp::query::<AddressParams>())
        .and(with_handler(handler.clone()))
        .and_then(fetch_weather);

    let fetch_by_form = warp::path!("fetch_weather")
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::form::<AddressParams>())
        .and(with_handler(handler))
        .and_then(fetch_weather);

    index
        .or(fetch_by_query)
        .unify()
        .or(fetch_by_form)
        .unify()
        .with(warp::trace::request())
}

async fn fetch_weather(
    params: AddressParams,
    handler: Arc<RequestHandler>,
) -> Result<Response, Rejection> {
    let response = handler.handle(params.address.as_deref()).await;
    Ok(into_response(response))
}

fn into_response(response: HandlerResponse) -> Response {
    match response {
        HandlerResponse::Redirect { to, notice } => see_other(&to, &notice),
        HandlerResponse::Render(view) => warp::reply::html(views::render_weather(&view)).into_response(),
    }
}

/// 303 to `to` carrying the notice in the query string.
fn see_other(to: &str, notice: &str) -> Response {
    let location = format!("{}?notice={}", to, urlencoding::encode(notice));
    warp::reply::with_header(
        warp::reply::with_status(warp::reply(), StatusCode::SEE_OTHER),
        warp::http::header::LOCATION,
        location,
    )
    .into_response()
}

/// Serve until Ctrl-C.
pub async fn serve(handler: Arc<RequestHandler>, config: &ServerConfig) -> Result<()> {
    let addr = config.socket_addr()?;

    let (bound, server) = warp::serve(routes(handler))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}
