//! HTTP front end for Weathercast: address form, weather pages, redirects.

pub mod handler;
pub mod routes;
pub mod views;

pub use handler::{HandlerResponse, RequestHandler, WeatherView};
pub use routes::{routes, serve};
