//! Reference catalog: descriptor/link pairs loaded from a CSV source.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use uuid::Uuid;

/// Default header of the descriptor column
pub const DEFAULT_DESCRIPTOR_COLUMN: &str = "Techstack";

/// Default header of the link column
pub const DEFAULT_LINK_COLUMN: &str = "Links";

/// One reference item available for retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Generated at load time, stable for the lifetime of the catalog value
    pub id: Uuid,
    pub descriptor: String,
    pub link: String,
}

impl CatalogEntry {
    /// Create an entry with a fresh id. Both fields must be non-blank.
    pub fn new(descriptor: impl Into<String>, link: impl Into<String>) -> Result<Self> {
        let descriptor = descriptor.into();
        let link = link.into();
        if descriptor.trim().is_empty() {
            return Err(Error::InvalidEntry("descriptor is empty".to_string()));
        }
        if link.trim().is_empty() {
            return Err(Error::InvalidEntry("link is empty".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            descriptor,
            link,
        })
    }
}

/// Loads catalog entries from CSV with a header row
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    descriptor_column: String,
    link_column: String,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTOR_COLUMN, DEFAULT_LINK_COLUMN)
    }
}

impl CatalogLoader {
    pub fn new(descriptor_column: impl Into<String>, link_column: impl Into<String>) -> Self {
        Self {
            descriptor_column: descriptor_column.into(),
            link_column: link_column.into(),
        }
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<CatalogEntry>> {
        let file = std::fs::File::open(path.as_ref())?;
        let entries = self.load_reader(file)?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = entries.len(),
            "loaded catalog"
        );
        Ok(entries)
    }

    /// Parse entries in row order.
    ///
    /// Both configured columns must be present in the header. A row whose
    /// descriptor or link cell is absent or blank fails the whole load.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<CatalogEntry>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let descriptor_idx = column_index(&headers, &self.descriptor_column)?;
        let link_idx = column_index(&headers, &self.link_column)?;

        let mut entries = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            // header occupies line 1
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(row as u64 + 2);

            let descriptor = required_cell(&record, descriptor_idx, &self.descriptor_column, line)?;
            let link = required_cell(&record, link_idx, &self.link_column, line)?;
            entries.push(CatalogEntry {
                id: Uuid::new_v4(),
                descriptor: descriptor.to_string(),
                link: link.to_string(),
            });
        }

        Ok(entries)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

fn required_cell<'a>(
    record: &'a csv::StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<&'a str> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::InvalidRow {
            line,
            column: column.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    const SAMPLE: &str = "\
Techstack,Links
\"React, Node.js, MongoDB\",https://example.com/react-portfolio
\"Python, Django, PostgreSQL\",https://example.com/python-portfolio
\"Kubernetes, Go\",https://example.com/devops-portfolio
";

    #[test]
    fn test_load_preserves_row_order() {
        let entries = CatalogLoader::default().load_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].descriptor, "React, Node.js, MongoDB");
        assert_eq!(entries[1].link, "https://example.com/python-portfolio");
        assert_eq!(entries[2].descriptor, "Kubernetes, Go");
    }

    #[test]
    fn test_ids_are_unique() {
        let entries = CatalogLoader::default().load_reader(SAMPLE.as_bytes()).unwrap();
        let ids: HashSet<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), entries.len());
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "Name,Links,Techstack\nshop,https://a,\"Rust, Axum\"\n";
        let entries = CatalogLoader::default().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].descriptor, "Rust, Axum");
        assert_eq!(entries[0].link, "https://a");
    }

    #[test]
    fn test_missing_column() {
        let csv = "Techstack,Url\nRust,https://a\n";
        let err = CatalogLoader::default().load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "Links"));
    }

    #[test]
    fn test_blank_cell_rejected() {
        let csv = "Techstack,Links\nRust,https://a\n  ,https://b\n";
        let err = CatalogLoader::default().load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRow { line: 3, ref column } if column == "Techstack"
        ));
    }

    #[test]
    fn test_short_row_rejected() {
        let csv = "Techstack,Links\nRust\n";
        let err = CatalogLoader::default().load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidRow { ref column, .. } if column == "Links"));
    }

    #[test]
    fn test_custom_columns_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stack,url").unwrap();
        writeln!(file, "\"Go, gRPC\",https://go.example").unwrap();

        let entries = CatalogLoader::new("stack", "url").load_path(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://go.example");
    }

    #[test]
    fn test_entry_requires_fields() {
        assert!(CatalogEntry::new("", "https://a").is_err());
        assert!(CatalogEntry::new("Rust", " ").is_err());
        assert!(CatalogEntry::new("Rust", "https://a").is_ok());
    }
}
