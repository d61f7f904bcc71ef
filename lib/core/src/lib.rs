//! # coldreach Core
//!
//! Core data structures for the coldreach retrieval pipeline:
//!
//! - [`Vector`] - Dense vector with SIMD distance kernels
//! - [`FlatIndex`] - Exact squared-L2 nearest neighbor index
//! - [`CatalogEntry`] / [`CatalogLoader`] - Reference items loaded from CSV
//!
//! ## Example
//!
//! ```rust
//! use coldreach_core::{FlatIndex, Vector};
//!
//! let index = FlatIndex::build(vec![
//!     Vector::new(vec![1.0, 0.0]),
//!     Vector::new(vec![0.0, 1.0]),
//! ]).unwrap();
//!
//! let hits = index.search(&Vector::new(vec![0.9, 0.1]), 1).unwrap();
//! assert_eq!(hits[0].position, 0);
//! ```

pub mod catalog;
pub mod error;
pub mod index;
pub mod vector;

/// Distance kernels with runtime dispatch:
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - scalar everywhere else
pub mod simd;

pub use catalog::{CatalogEntry, CatalogLoader, DEFAULT_DESCRIPTOR_COLUMN, DEFAULT_LINK_COLUMN};
pub use error::{Error, Result};
pub use index::{FlatIndex, Neighbor};
pub use vector::Vector;
