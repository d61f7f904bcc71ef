//! Pipeline configuration, assembled by the composition root

use std::path::PathBuf;

use coldreach_core::{CatalogLoader, DEFAULT_DESCRIPTOR_COLUMN, DEFAULT_LINK_COLUMN};
use serde::{Deserialize, Serialize};

use crate::{PipelineError, Result};

pub const DEFAULT_TOP_K: usize = 5;

/// Retrieval settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of links returned per job
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(PipelineError::InvalidConfig("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

/// Who the email is written as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub name: String,
    pub title: String,
    pub company: String,
    /// One or two sentences describing the company, used in the email prompt
    pub pitch: String,
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self {
            name: "Business Development Team".to_string(),
            title: "Software Engineer".to_string(),
            company: "Acme Consulting".to_string(),
            pitch: "an AI & Software Consulting company that integrates business processes \
                    via automated tools. We empower enterprises with tailored solutions for \
                    scalability, optimization, cost reduction, and efficiency."
                .to_string(),
        }
    }
}

/// Where the reference catalog lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub descriptor_column: String,
    pub link_column: String,
}

impl CatalogConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            descriptor_column: DEFAULT_DESCRIPTOR_COLUMN.to_string(),
            link_column: DEFAULT_LINK_COLUMN.to_string(),
        }
    }

    pub fn loader(&self) -> CatalogLoader {
        CatalogLoader::new(&self.descriptor_column, &self.link_column)
    }
}
