use axum::{Json, Router, extract::State, routing::post};
use engine::comic::Panel;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Deserialize)]
struct StoryRequest {
    theme: String,
}

#[derive(Serialize)]
struct StoryResponse {
    panels: Vec<Panel>,
}

async fn create_story(
    State(studio): State<AppState>,
    Json(req): Json<StoryRequest>,
) -> Result<Json<StoryResponse>, ApiError> {
    if req.theme.trim().is_empty() {
        return Err(ApiError::bad_request("Theme must not be empty"));
    }

    let story = studio.generate_story(&req.theme).await?;
    Ok(Json(StoryResponse {
        panels: story.panels,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/story", post(create_story))
}
