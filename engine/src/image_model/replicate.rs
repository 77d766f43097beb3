use std::{pin::Pin, sync::Arc, time::Duration};

use log::debug;
use reqwest::Client;
use serde_json::json;
use tokio::time::{Instant, sleep};

use crate::{
    Error, Result,
    image_model::{Model, first_output, parse_prediction},
};

use super::ImageModel;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Deadline for one prediction. A job still pending at this point is reported
/// as a timeout instead of being polled forever.
const POLL_BUDGET: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct ReplicateImageModel {
    model: Model,
    client: Client,
    api_key: String,
    version: String,
    input_builder: Arc<dyn Fn(&str) -> serde_json::Value + Send + Sync>,
}

impl ReplicateImageModel {
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

impl ImageModel for ReplicateImageModel {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            // 1. Create prediction
            let create_resp = self
                .client
                .post("https://api.replicate.com/v1/predictions")
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "version": self.version,
                    "input": (self.input_builder)(prompt),
                }))
                .send()
                .await?;

            let status = create_resp.status();
            let body = create_resp.text().await?;
            if !status.is_success() {
                return Err(Error::Upstream {
                    service: "Replicate",
                    status,
                    body,
                });
            }

            let prediction_infos =
                serde_json::from_str::<serde_json::Value>(&body).map_err(|e| Error::Parse {
                    service: "Replicate",
                    message: e.to_string(),
                })?;

            let prediction_url = prediction_infos["urls"]["get"]
                .as_str()
                .ok_or_else(|| {
                    Error::InvalidResponse(format!(
                        "Missing prediction get URL:\n{prediction_infos:#?}"
                    ))
                })?
                .to_string();

            // 2. Poll until finished, within the budget
            let deadline = Instant::now() + POLL_BUDGET;
            loop {
                let body = self
                    .client
                    .get(&prediction_url)
                    .bearer_auth(&self.api_key)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;

                let resp = parse_prediction(&body)?;
                debug!("prediction poll: {}", resp.status);

                match resp.status.as_str() {
                    "succeeded" => return first_output(resp.output),
                    "failed" | "canceled" => {
                        return Err(Error::GenerationFailed(format!(
                            "Replicate prediction {}:\n{resp:#?}",
                            resp.status
                        )));
                    }
                    _ => {
                        if Instant::now() >= deadline {
                            return Err(Error::Timeout {
                                seconds: POLL_BUDGET.as_secs(),
                            });
                        }
                        sleep(POLL_INTERVAL).await;
                    }
                }
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
