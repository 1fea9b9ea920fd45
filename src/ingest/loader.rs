//! Reading source documents from disk.
//!
//! The caller states the source kind for every path explicitly; nothing is
//! inferred from filenames. Unreadable or unparseable documents are logged
//! and skipped so a broken feed degrades the catalog instead of failing the
//! request.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tokio::fs;

use crate::domain::SourceKind;

/// A source document location tagged with its kind
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub kind: SourceKind,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn new(kind: SourceKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Why a single source document was skipped
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load all readable, parseable source documents.
///
/// Returns the tagged raw documents ready for `normalizer::ingest`. Sources
/// that fail are warned about and dropped; the result may be partial or
/// empty, never an error.
pub async fn load_sources(specs: &[SourceSpec]) -> Vec<(SourceKind, Value)> {
    let mut documents = Vec::with_capacity(specs.len());

    for spec in specs {
        match load_one(spec).await {
            Ok(document) => documents.push((spec.kind, document)),
            Err(error) => {
                tracing::warn!(source = %spec.kind, %error, "Skipping source document");
            }
        }
    }

    documents
}

async fn load_one(spec: &SourceSpec) -> Result<Value, SourceError> {
    let content = fs::read_to_string(&spec.path)
        .await
        .map_err(|source| SourceError::Read {
            path: spec.path.display().to_string(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| SourceError::Parse {
        path: spec.path.display().to_string(),
        source,
    })
}
