//! # coldreach Providers
//!
//! External collaborators consumed by the retrieval pipeline, each behind a
//! narrow trait so tests can substitute deterministic doubles:
//!
//! - [`EmbeddingProvider`] - text to vectors ([`OpenAiEmbedder`], [`HashEmbedder`])
//! - [`TextCompletion`] - model calls in JSON or free-text mode ([`OpenAiChat`])
//! - [`PageFetcher`] - source page download ([`HttpPageFetcher`])
//! - [`MailTransport`] - outbound mail ([`SmtpMailer`])
//!
//! All HTTP clients are blocking; none of them retry unless configured to.

pub mod completion;
pub mod embedder;
pub mod error;
pub mod fetch;
pub mod hashing;
pub mod mail;

pub use completion::{CompletionConfig, CompletionMode, OpenAiChat, TextCompletion};
pub use embedder::{EmbeddingConfig, EmbeddingProvider, OpenAiEmbedder};
pub use error::{ProviderError, Result};
pub use fetch::{html_to_text, HttpPageFetcher, PageFetcher};
pub use hashing::HashEmbedder;
pub use mail::{deliver, MailConfig, MailTransport, SmtpMailer, TransportError};
