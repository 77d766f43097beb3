use thiserror::Error;

/// Everything a generation run can fail with. Each external call site picks
/// the variant that classifies its failure; the server flattens them into one
/// error response at the boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential or endpoint is missing. Raised while loading
    /// configuration, before any client exists.
    #[error("{0}")]
    Config(String),

    /// The response body is not valid JSON.
    #[error("Failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    /// The response is valid JSON with the wrong shape (panel count,
    /// missing or empty fields).
    #[error("{0}")]
    Schema(String),

    /// A prediction finished without a usable output list.
    #[error("{0}")]
    InvalidResponse(String),

    /// The service reported a terminal failure status.
    #[error("{0}")]
    GenerationFailed(String),

    /// The polling budget ran out while the prediction was still pending.
    #[error("Prediction still pending after {seconds}s")]
    Timeout { seconds: u64 },

    /// Non-success HTTP status from an external service.
    #[error("{service} error {status}: {body}")]
    Upstream {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
