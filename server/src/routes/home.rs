use axum::{Router, response::Html, routing::get};

use crate::AppState;

async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
