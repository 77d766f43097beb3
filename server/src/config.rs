use engine::{Error, image_model::Model};

const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct Config {
    pub chat_api_key: String,
    pub chat_endpoint: String,
    pub chat_model: String,
    pub replicate_api_token: String,
    pub image_model: Model,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Reads the process environment. Missing credentials classify as
    /// [`Error::Config`] here, before any client is constructed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let require = |key: &str, what: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{what} not configured")))
        };

        let chat_api_key = require("AZURE_OPENAI_KEY", "Azure OpenAI API key")?;
        let chat_endpoint = require("AZURE_OPENAI_ENDPOINT", "Azure OpenAI endpoint")?;
        let replicate_api_token = require("REPLICATE_API_TOKEN", "Replicate API token")?;

        let chat_model =
            lookup("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let image_model = match lookup("IMAGE_MODEL").as_deref() {
            None | Some("sdxl") => Model::Sdxl,
            Some("sdxl-blocking") => Model::SdxlBlocking,
            Some(other) => {
                return Err(Error::Config(format!("Unknown IMAGE_MODEL: {other}")));
            }
        };

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .map_err(|_| Error::Config("PORT must be a number".into()))?;

        Ok(Config {
            chat_api_key,
            chat_endpoint,
            chat_model,
            replicate_api_token,
            image_model,
            host,
            port,
        })
    }
}
