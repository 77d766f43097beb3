use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::Result;

pub trait LLM {
    fn send_request<'a>(
        &'a self,
        req: Request,
    ) -> Pin<Box<dyn Future<Output = Result<OutputMessage>> + Send + 'a>>;

    fn clone(&self) -> Box<dyn LLM + Send + Sync + 'static>;
}

pub struct Request {
    pub system: Option<String>,
    pub messages: Vec<InputMessage>,
    pub max_tokens: usize,
    /// Ask the provider for a machine-parseable JSON body instead of prose.
    pub json_response: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn user(content: String) -> InputMessage {
        Self {
            role: Role::User,
            content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputMessage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

pub mod open_ai_chat;
pub use open_ai_chat::OpenAIChat;
