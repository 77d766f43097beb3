use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Both request shapes this endpoint has answered over its life: the
/// multi-panel form, and the earlier single-prompt one. Each gets the
/// matching response shape back.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateRequest {
    Panels { panels: Vec<PanelPrompt> },
    Single { prompt: String },
}

#[derive(Deserialize)]
struct PanelPrompt {
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GenerateResponse {
    Panels {
        #[serde(rename = "imageUrls")]
        image_urls: Vec<String>,
    },
    Single {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

async fn generate_images(
    State(studio): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    match req {
        GenerateRequest::Panels { panels } => {
            let prompts: Vec<String> = panels.into_iter().map(|p| p.image_prompt).collect();
            let image_urls = studio.render_panels(&prompts).await?;
            Ok(Json(GenerateResponse::Panels { image_urls }))
        }
        GenerateRequest::Single { prompt } => {
            let urls = studio.render_panels(std::slice::from_ref(&prompt)).await?;
            let image_url = urls
                .into_iter()
                .next()
                .ok_or_else(|| ApiError::internal("Renderer returned no image"))?;
            Ok(Json(GenerateResponse::Single { image_url }))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate_images))
}
