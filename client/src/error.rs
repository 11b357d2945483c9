/// Errors surfaced by every clientd binding.
///
/// Nothing is retried or downgraded: the first failure of a call is returned
/// as-is, and client state is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP error! status: {status}, message: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to read response body: {0}")]
    Io(#[source] reqwest::Error),
    #[error("failed to serialize request: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("failed to deserialize response: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("no gateways available")]
    NoGatewaysAvailable,
    #[error("{0} required: no override given and no active default set")]
    MissingIdentifier(&'static str),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code, if the daemon answered with a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
