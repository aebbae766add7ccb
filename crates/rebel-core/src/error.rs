use thiserror::Error;

/// Any failure reaching the text-generation service or making sense of its
/// answer. The conversation treats every variant the same way; the detail is
/// only kept for the log.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to text-generation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("text-generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode text-generation response: {0}")]
    Decode(#[from] serde_json::Error),
}
