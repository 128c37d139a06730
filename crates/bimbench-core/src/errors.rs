//! Setup-error taxonomy.
//!
//! Setup errors are the only failures that propagate out of the engine:
//! everything that goes wrong while evaluating a single question is captured
//! as a [`crate::model::Verdict`] on that question's row instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("questions catalog not found: {0}")]
    CatalogNotFound(PathBuf),

    #[error("unsupported catalog format {extension:?}: {path} (use .json or .csv)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("failed to parse CSV catalog {path}")]
    CatalogCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON catalog {path}")]
    CatalogJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IFC model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("models directory not found: {0}")]
    ModelsDirNotFound(PathBuf),

    #[error("no .ifc models found in {0}")]
    NoModels(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
