use std::pin::Pin;

use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LLM, OutputMessage, Request, Role};
use crate::{Error, Result};

/// Pinned to the deployment the service was set up with.
const API_VERSION: &str = "2024-02-15-preview";

#[derive(Debug, Clone)]
pub struct OpenAIChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIChat {
    pub fn new(api_key: String, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

impl LLM for OpenAIChat {
    fn send_request<'a>(
        &'a self,
        req: Request,
    ) -> Pin<Box<dyn Future<Output = Result<OutputMessage>> + Send + 'a>> {
        Box::pin(async move {
            let mut messages = Vec::new();

            if let Some(system) = req.system {
                messages.push(OpenAIMessage {
                    role: "system",
                    content: system,
                });
            }

            for msg in req.messages {
                messages.push(OpenAIMessage {
                    role: match msg.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: msg.content,
                });
            }

            let body = OpenAIChatRequest {
                model: self.model.clone(),
                messages,
                max_tokens: req.max_tokens,
                response_format: req.json_response.then_some(ResponseFormat {
                    format_type: "json_object",
                }),
            };

            // Azure front ends authenticate with the `api-key` header, plain
            // OpenAI-compatible ones with the bearer token; send both so the
            // client works against either.
            let res = self
                .client
                .post(format!(
                    "{}/chat/completions",
                    self.base_url.trim_end_matches('/')
                ))
                .query(&[("api-version", API_VERSION)])
                .bearer_auth(&self.api_key)
                .header("api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            if !res.status().is_success() {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                return Err(Error::Upstream {
                    service: "OpenAI",
                    status,
                    body,
                });
            }

            let text = res.text().await?;
            debug!("OpenAI response:\n{text}");

            let completion: OpenAIChatResponse =
                serde_json::from_str(&text).map_err(|e| Error::Parse {
                    service: "OpenAI",
                    message: e.to_string(),
                })?;

            let usage = completion.usage.unwrap_or_default();
            let content = completion
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|content| !content.is_empty())
                .ok_or_else(|| {
                    Error::InvalidResponse("No content received from chat completion".into())
                })?;

            Ok(OutputMessage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                text: content,
            })
        })
    }

    fn clone(&self) -> Box<dyn LLM + Send + Sync + 'static> {
        Box::new(Clone::clone(self))
    }
}

//
// ===== OpenAI wire types =====
//

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
