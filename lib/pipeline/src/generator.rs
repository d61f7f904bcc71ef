//! End-to-end cold email drafting
//!
//! fetch page -> extract JSON -> normalize -> load catalog -> retrieve links
//! -> write email. Any provider failure aborts the draft.

use std::path::PathBuf;

use coldreach_core::{CatalogEntry, CatalogLoader};
use coldreach_providers::{CompletionMode, EmbeddingProvider, PageFetcher, TextCompletion};
use coldreach_schema::{normalize, parse_model_output, JobRecord, RawExtraction};
use tracing::{info, warn};

use crate::config::{CatalogConfig, SenderIdentity};
use crate::prompt::{email_prompt, extraction_prompt};
use crate::retrieval::RetrievalPipeline;
use crate::Result;

/// Where catalog entries come from on each draft
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Re-read on every draft
    File { path: PathBuf, loader: CatalogLoader },
    /// Fixed entries
    Entries(Vec<CatalogEntry>),
}

impl CatalogSource {
    pub fn load(&self) -> Result<Vec<CatalogEntry>> {
        match self {
            CatalogSource::File { path, loader } => Ok(loader.load_path(path)?),
            CatalogSource::Entries(entries) => Ok(entries.clone()),
        }
    }
}

impl From<CatalogConfig> for CatalogSource {
    fn from(config: CatalogConfig) -> Self {
        let loader = config.loader();
        CatalogSource::File {
            path: config.path,
            loader,
        }
    }
}

/// One generated email and what it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub job: JobRecord,
    pub links: Vec<String>,
    pub body: String,
}

impl Draft {
    pub fn subject(&self) -> String {
        subject_for(&self.job)
    }
}

/// Subject line derived from the posting
pub fn subject_for(job: &JobRecord) -> String {
    let role = job.role.trim();
    if role.is_empty() {
        "Exploring opportunities".to_string()
    } else {
        format!("Application for {role}")
    }
}

/// Append the signature block unless the body already ends with it
pub fn with_signature(body: &str, identity: &SenderIdentity) -> String {
    let signature = format!(
        "Regards,\n{}\n{}\n{}",
        identity.name, identity.title, identity.company
    );
    let trimmed = body.trim_end();
    if trimmed.ends_with(&signature) {
        return trimmed.to_string();
    }
    if trimmed.is_empty() {
        return signature;
    }
    format!("{trimmed}\n\n{signature}")
}

/// Drafts cold emails for job posting URLs
pub struct ColdMailGenerator<F, C, E> {
    fetcher: F,
    model: C,
    pipeline: RetrievalPipeline<E>,
    catalog: CatalogSource,
    identity: SenderIdentity,
}

impl<F, C, E> ColdMailGenerator<F, C, E>
where
    F: PageFetcher,
    C: TextCompletion,
    E: EmbeddingProvider,
{
    pub fn new(
        fetcher: F,
        model: C,
        pipeline: RetrievalPipeline<E>,
        catalog: CatalogSource,
        identity: SenderIdentity,
    ) -> Self {
        Self {
            fetcher,
            model,
            pipeline,
            catalog,
            identity,
        }
    }

    pub fn identity(&self) -> &SenderIdentity {
        &self.identity
    }

    /// Extract the posting at `link` into a record
    pub fn extract(&self, link: &str) -> Result<JobRecord> {
        let page = self.fetcher.fetch(link)?;
        let raw = if page.trim().is_empty() {
            info!(link, "source page is empty");
            RawExtraction::empty()
        } else {
            let output = self.model.complete(&extraction_prompt(&page), CompletionMode::Json)?;
            parse_model_output(&output)
        };
        let job = normalize(raw);
        if job.is_empty() {
            warn!(link, "no job details extracted, retrieving with an empty query");
        }
        Ok(job)
    }

    pub fn generate(&self, link: &str) -> Result<Draft> {
        let job = self.extract(link)?;
        info!(role = %job.role, skills = job.skills.len(), "extracted job posting");

        let catalog = self.catalog.load()?;
        let links = self.pipeline.retrieve(&job, &catalog)?;

        let body = self.model.complete(
            &email_prompt(&job, &links, &self.identity),
            CompletionMode::Text,
        )?;
        Ok(Draft { job, links, body })
    }
}
