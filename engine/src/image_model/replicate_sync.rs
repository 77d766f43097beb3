use std::{pin::Pin, sync::Arc};

use reqwest::Client;
use serde_json::json;

use crate::{
    Error, Result,
    image_model::{Model, first_output, parse_prediction},
};

use super::ImageModel;

/// Single-call mode: `Prefer: wait` holds the connection open until the
/// prediction is terminal, so there is no polling loop on our side.
#[derive(Clone)]
pub struct ReplicateSyncModel {
    model: Model,
    client: Client,
    api_key: String,
    version: String,
    input_builder: Arc<dyn Fn(&str) -> serde_json::Value + Send + Sync>,
}

impl ReplicateSyncModel {
    pub fn new(
        model: Model,
        api_key: String,
        version: String,
        input_builder: impl Fn(&str) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            model,
            client: Client::new(),
            api_key,
            version,
            input_builder: Arc::new(input_builder),
        }
    }
}

impl ImageModel for ReplicateSyncModel {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let resp = self
                .client
                .post("https://api.replicate.com/v1/predictions")
                .bearer_auth(&self.api_key)
                .header("Prefer", "wait")
                .json(&json!({
                    "version": self.version,
                    "input": (self.input_builder)(prompt),
                }))
                .send()
                .await?;

            let status = resp.status();
            let body = resp.text().await?;
            if !status.is_success() {
                return Err(Error::Upstream {
                    service: "Replicate",
                    status,
                    body,
                });
            }

            let prediction = parse_prediction(&body)?;

            match prediction.status.as_str() {
                "failed" | "canceled" => Err(Error::GenerationFailed(format!(
                    "Replicate prediction {}:\n{prediction:#?}",
                    prediction.status
                ))),
                _ => first_output(prediction.output),
            }
        })
    }

    fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static> {
        Box::new(Clone::clone(self))
    }

    fn model(&self) -> Model {
        self.model
    }
}
