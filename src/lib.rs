//! # coldreach
//!
//! Cold outreach drafting for job postings.
//!
//! coldreach reads a job posting, asks a language model to extract its key
//! attributes, normalizes that output into a strict record, and ranks a
//! portfolio catalog against the posting's skills by embedding similarity.
//! The closest portfolio links go into a generated cold email.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! export GOOGLE_API_KEY=...
//! coldreach --catalog portfolio.csv generate --link https://jobs.example/123
//! coldreach --catalog portfolio.csv retrieve --offline --skills "Python, Machine Learning"
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use coldreach::prelude::*;
//!
//! let catalog = vec![
//!     CatalogEntry::new("Python, Machine Learning, PyTorch", "https://ml.example").unwrap(),
//!     CatalogEntry::new("React, TypeScript", "https://web.example").unwrap(),
//! ];
//! let job = normalize(parse_model_output(
//!     r#"{"role": "ML Engineer", "skills": ["Python", "Machine Learning"]}"#,
//! ));
//!
//! let links = retrieve(&job, &catalog, 1, &HashEmbedder::default()).unwrap();
//! assert_eq!(links.len(), 1);
//! ```
//!
//! ## Crate Structure
//!
//! - [`coldreach-core`](coldreach_core) - vectors, the flat L2 index, catalog loading
//! - [`coldreach-schema`](coldreach_schema) - model output parsing and normalization
//! - [`coldreach-providers`](coldreach_providers) - embeddings, chat, page fetch, SMTP
//! - [`coldreach-pipeline`](coldreach_pipeline) - retrieval and email drafting

// Re-export core types
pub use coldreach_core::{
    CatalogEntry, CatalogLoader, Error, FlatIndex, Neighbor, Result, Vector,
};

// Re-export schema
pub use coldreach_schema::{normalize, parse_model_output, JobRecord, RawExtraction};

// Re-export providers
pub use coldreach_providers::{
    deliver, EmbeddingProvider, HashEmbedder, MailTransport, OpenAiChat, OpenAiEmbedder,
    PageFetcher, ProviderError, SmtpMailer, TextCompletion,
};

// Re-export pipeline
pub use coldreach_pipeline::{
    retrieve, ColdMailGenerator, Draft, PipelineError, RetrievalPipeline, SenderIdentity,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use coldreach_core::{CatalogEntry, CatalogLoader, FlatIndex, Neighbor, Vector};
    pub use coldreach_pipeline::{
        retrieve, subject_for, with_signature, CatalogSource, ColdMailGenerator, Draft,
        RetrievalConfig, RetrievalPipeline, SenderIdentity,
    };
    pub use coldreach_providers::{
        CompletionMode, EmbeddingProvider, HashEmbedder, MailTransport, PageFetcher,
        TextCompletion,
    };
    pub use coldreach_schema::{normalize, parse_model_output, JobRecord, RawExtraction};
}
