use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure of an external model, embedding or fetch call.
///
/// Fatal to the invocation that issued the call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
