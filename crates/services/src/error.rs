//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use geoquiz_core::model::{CatalogError, RegionId, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Failure to read or parse a map asset. Fatal to starting a session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssetLoadError {
    #[error("could not read map asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse map asset {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Errors emitted while loading the map catalog configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogConfigError {
    #[error("could not read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// Errors emitted by the quiz controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
    #[error("session already completed")]
    SessionCompleted,
    #[error("{0} is not one of the offered choices")]
    UnknownChoice(RegionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizError {
    /// True when the map could not produce a playable session (missing or empty asset).
    #[must_use]
    pub fn is_start_failure(&self) -> bool {
        matches!(
            self,
            QuizError::AssetLoad(_) | QuizError::Session(SessionStateError::EmptyRegionSet)
        )
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogConfigError),
}
