//! # coldreach Pipeline
//!
//! Ties the core index, the schema normalizer and the providers together.
//!
//! - [`retrieve`] ranks catalog links for one job record
//! - [`ColdMailGenerator`] turns a posting URL into a [`Draft`]
//!
//! ```rust
//! use coldreach_core::CatalogEntry;
//! use coldreach_pipeline::retrieve;
//! use coldreach_providers::HashEmbedder;
//! use coldreach_schema::JobRecord;
//!
//! let catalog = vec![
//!     CatalogEntry::new("Python, Machine Learning", "https://ml.example").unwrap(),
//!     CatalogEntry::new("React, CSS", "https://web.example").unwrap(),
//! ];
//! let job = JobRecord {
//!     skills: vec!["Python".into(), "Machine Learning".into()],
//!     ..Default::default()
//! };
//! let links = retrieve(&job, &catalog, 1, &HashEmbedder::default()).unwrap();
//! assert_eq!(links.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod retrieval;

pub use config::{CatalogConfig, RetrievalConfig, SenderIdentity, DEFAULT_TOP_K};
pub use error::{PipelineError, Result};
pub use generator::{subject_for, with_signature, CatalogSource, ColdMailGenerator, Draft};
pub use prompt::{email_prompt, extraction_prompt};
pub use retrieval::{query_vector, retrieve, retrieve_ranked, RankedEntry, RetrievalPipeline};
