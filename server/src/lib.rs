use std::sync::Arc;

use axum::Router;
use engine::comic::Studio;

pub mod config;
pub mod error;
pub mod routes;

pub use config::Config;

pub type AppState = Arc<Studio>;

pub fn app(studio: Studio) -> Router {
    Router::new()
        .merge(routes::home::router())
        .merge(routes::health::router())
        .merge(routes::story::router())
        .merge(routes::generate::router())
        .with_state(Arc::new(studio))
}
