//! Job record to ranked catalog links.
//!
//! Every call embeds the catalog, builds a fresh [`FlatIndex`], derives a
//! query from the job's skills and searches. Nothing is cached between
//! calls.

use coldreach_core::{CatalogEntry, FlatIndex, Vector};
use coldreach_providers::{EmbeddingProvider, ProviderError};
use coldreach_schema::JobRecord;
use tracing::{debug, info};

use crate::config::RetrievalConfig;
use crate::Result;

/// A catalog entry with its squared L2 distance to the query
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<'a> {
    pub entry: &'a CatalogEntry,
    pub distance: f32,
}

/// Retrieval with an injected embedder
pub struct RetrievalPipeline<E> {
    embedder: E,
    config: RetrievalConfig,
}

impl<E: EmbeddingProvider> RetrievalPipeline<E> {
    pub fn new(embedder: E, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { embedder, config })
    }

    /// Links of the configured `top_k` nearest entries
    pub fn retrieve(&self, job: &JobRecord, catalog: &[CatalogEntry]) -> Result<Vec<String>> {
        retrieve(job, catalog, self.config.top_k, &self.embedder)
    }

    pub fn retrieve_ranked<'a>(
        &self,
        job: &JobRecord,
        catalog: &'a [CatalogEntry],
    ) -> Result<Vec<RankedEntry<'a>>> {
        retrieve_ranked(job, catalog, self.config.top_k, &self.embedder)
    }
}

/// Links of the `min(k, catalog.len())` entries nearest to the job's skills,
/// closest first.
pub fn retrieve<E: EmbeddingProvider + ?Sized>(
    job: &JobRecord,
    catalog: &[CatalogEntry],
    k: usize,
    embedder: &E,
) -> Result<Vec<String>> {
    Ok(retrieve_ranked(job, catalog, k, embedder)?
        .into_iter()
        .map(|ranked| ranked.entry.link.clone())
        .collect())
}

pub fn retrieve_ranked<'a, E: EmbeddingProvider + ?Sized>(
    job: &JobRecord,
    catalog: &'a [CatalogEntry],
    k: usize,
    embedder: &E,
) -> Result<Vec<RankedEntry<'a>>> {
    if catalog.is_empty() {
        info!("catalog is empty, nothing to retrieve");
        return Ok(Vec::new());
    }

    let descriptors: Vec<String> = catalog.iter().map(|e| e.descriptor.clone()).collect();
    let vectors = embedder.embed_many(&descriptors)?;
    if vectors.len() != catalog.len() {
        return Err(ProviderError::InvalidResponse(format!(
            "embedded {} vectors for {} catalog entries",
            vectors.len(),
            catalog.len()
        ))
        .into());
    }

    let index = FlatIndex::build(vectors)?;
    let query = query_vector(job, &index, embedder)?;
    let hits = index.search(&query, k)?;

    info!(
        catalog = catalog.len(),
        skills = job.skills.len(),
        hits = hits.len(),
        "retrieved reference links"
    );

    Ok(hits
        .into_iter()
        .map(|hit| RankedEntry {
            entry: &catalog[hit.position],
            distance: hit.distance,
        })
        .collect())
}

/// Mean of the skill embeddings, or the origin of the index's space when the
/// job lists no skills.
pub fn query_vector<E: EmbeddingProvider + ?Sized>(
    job: &JobRecord,
    index: &FlatIndex,
    embedder: &E,
) -> Result<Vector> {
    if job.skills.is_empty() {
        debug!(dim = index.dim(), "no skills extracted, querying with the zero vector");
        return Ok(Vector::zeros(index.dim()));
    }

    let skill_vectors = embedder.embed_many(&job.skills)?;
    if skill_vectors.len() != job.skills.len() {
        return Err(ProviderError::InvalidResponse(format!(
            "embedded {} vectors for {} skills",
            skill_vectors.len(),
            job.skills.len()
        ))
        .into());
    }
    Ok(Vector::mean(&skill_vectors)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineError;
    use coldreach_providers::Result as ProviderResult;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed vectors per known string, counting batch calls
    struct TableEmbedder {
        table: HashMap<&'static str, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TableEmbedder {
        fn new(rows: &[(&'static str, Vec<f32>)]) -> Self {
            Self {
                table: rows.iter().cloned().collect(),
                calls: Default::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EmbeddingProvider for TableEmbedder {
        fn embed_many(&self, texts: &[String]) -> ProviderResult<Vec<Vector>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            texts
                .iter()
                .map(|t| {
                    self.table
                        .get(t.as_str())
                        .map(|v| Vector::new(v.clone()))
                        .ok_or_else(|| ProviderError::InvalidResponse(format!("unknown text {t}")))
                })
                .collect()
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("Python, ML", "https://a").unwrap(),
            CatalogEntry::new("Kubernetes, Go", "https://b").unwrap(),
            CatalogEntry::new("React, TS", "https://c").unwrap(),
        ]
    }

    fn embedder() -> TableEmbedder {
        TableEmbedder::new(&[
            ("Python, ML", vec![1.0, 0.0, 0.0]),
            ("Kubernetes, Go", vec![0.0, 1.0, 0.0]),
            ("React, TS", vec![0.0, 0.0, 3.0]),
            ("Python", vec![1.0, 0.2, 0.0]),
            ("Machine Learning", vec![0.8, 0.0, 0.0]),
        ])
    }

    fn job(skills: &[&str]) -> JobRecord {
        JobRecord {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_python_ml_scenario() {
        let embedder = embedder();
        let links = retrieve(&job(&["Python", "Machine Learning"]), &catalog(), 2, &embedder).unwrap();

        // query = [0.9, 0.1, 0.0]: a = 0.02, b = 1.62, c = 9.82
        assert_eq!(links, vec!["https://a", "https://b"]);
        assert_eq!(embedder.calls(), 2);
    }

    #[test]
    fn test_ranked_distances_ascend() {
        let embedder = embedder();
        let catalog = catalog();
        let ranked = retrieve_ranked(&job(&["Python", "Machine Learning"]), &catalog, 10, &embedder).unwrap();

        assert_eq!(ranked.len(), 3);
        assert!((ranked[0].distance - 0.02).abs() < 1e-5);
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(ranked[2].entry.link, "https://c");
    }

    #[test]
    fn test_empty_skills_use_origin() {
        let embedder = embedder();
        let links = retrieve(&job(&[]), &catalog(), 2, &embedder).unwrap();

        // a and b tie at 1.0 and keep catalog order; c is 9.0 away
        assert_eq!(links, vec!["https://a", "https://b"]);
        assert_eq!(embedder.calls(), 1);
    }

    #[test]
    fn test_zero_query_matches_index_dimension() {
        let embedder = embedder();
        let vectors = embedder
            .embed_many(&["Python, ML".to_string(), "React, TS".to_string()])
            .unwrap();
        let index = FlatIndex::build(vectors).unwrap();

        let query = query_vector(&job(&[]), &index, &embedder).unwrap();
        assert_eq!(query.dim(), 3);
        assert!(query.is_zero());
    }

    #[test]
    fn test_empty_catalog_skips_embedder() {
        let embedder = embedder();
        assert!(retrieve(&job(&["Python"]), &[], 5, &embedder).unwrap().is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[test]
    fn test_duplicate_links_are_kept() {
        let embedder = embedder();
        let catalog = vec![
            CatalogEntry::new("Python, ML", "https://same").unwrap(),
            CatalogEntry::new("Kubernetes, Go", "https://same").unwrap(),
        ];
        let links = retrieve(&job(&["Python"]), &catalog, 5, &embedder).unwrap();
        assert_eq!(links, vec!["https://same", "https://same"]);
    }

    #[test]
    fn test_provider_failure_is_fatal() {
        let embedder = embedder();
        let err = retrieve(&job(&["COBOL"]), &catalog(), 2, &embedder).unwrap_err();
        assert!(matches!(err, PipelineError::Provider(_)));
    }

    #[test]
    fn test_dimension_mismatch_is_contract_error() {
        let embedder = TableEmbedder::new(&[
            ("Python, ML", vec![1.0, 0.0]),
            ("Kubernetes, Go", vec![0.0, 1.0]),
            ("React, TS", vec![1.0, 1.0]),
            ("Python", vec![1.0, 0.0, 0.0]),
        ]);
        let err = retrieve(&job(&["Python"]), &catalog(), 2, &embedder).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Core(coldreach_core::Error::InvalidDimension { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_pipeline_uses_configured_k() {
        let pipeline = RetrievalPipeline::new(embedder(), RetrievalConfig { top_k: 1 }).unwrap();
        let links = pipeline.retrieve(&job(&["Machine Learning"]), &catalog()).unwrap();
        assert_eq!(links, vec!["https://a"]);

        assert!(RetrievalPipeline::new(embedder(), RetrievalConfig { top_k: 0 }).is_err());
    }

    #[test]
    fn test_catalog_ids_follow_entries() {
        let embedder = embedder();
        let catalog = catalog();
        let ranked = retrieve_ranked(&job(&["Python"]), &catalog, 1, &embedder).unwrap();
        assert_eq!(ranked[0].entry.id, catalog[0].id);
    }
}
