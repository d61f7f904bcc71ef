use coldreach_providers::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Core(#[from] coldreach_core::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
