use thiserror::Error;

pub type Result<T, E = IngestError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Remote returned HTTP {status} for {url}")]
    Remote { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No usable games found for '{identity}'")]
    EmptyResult { identity: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("'{identity}' played neither side ({white} vs {black})")]
    IdentityMismatch {
        identity: String,
        white: String,
        black: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IngestError::NotFound { .. })
    }
}
