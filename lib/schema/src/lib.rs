//! # coldreach Schema
//!
//! Validation layer between the extraction model and the retrieval pipeline.
//!
//! ## Overview
//!
//! The extraction model is asked for a JSON object with the keys `role`,
//! `experience`, `skills` and `description`. What comes back drifts: fenced
//! code blocks, arrays of objects, `skills` as a comma-joined string, or no
//! JSON at all. This crate folds every one of those shapes into a strict
//! [`JobRecord`]:
//!
//! 1. [`parse_model_output`] turns raw text into a [`RawExtraction`]
//! 2. [`normalize`] coerces the extraction into a [`JobRecord`]
//!
//! Untyped JSON does not leave this crate.
//!
//! ```rust
//! use coldreach_schema::{normalize, parse_model_output};
//!
//! let raw = parse_model_output(r#"[{"role": "SRE", "skills": "Linux, Go"}]"#);
//! let job = normalize(raw);
//! assert_eq!(job.skills, vec!["Linux", "Go"]);
//! ```

pub mod normalize;
pub mod raw;
pub mod record;

pub use normalize::{coerce_skills, normalize, normalize_value, split_skills};
pub use raw::{parse_model_output, RawExtraction};
pub use record::JobRecord;
