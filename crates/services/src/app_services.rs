use std::path::PathBuf;
use std::sync::Arc;

use geoquiz_core::model::{MapCatalog, MapId, RegionCatalogEntry};
use storage::repository::Storage;

use crate::Clock;
use crate::asset::RegionAssetLoader;
use crate::catalog::load_catalog;
use crate::error::AppServicesError;
use crate::ports::PresentationPort;
use crate::quiz::QuizLoopService;

/// Settings needed to assemble the app services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub assets_root: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

/// Assembles the catalog and quiz controller on top of a storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<MapCatalog>,
    quiz: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog loading fails.
    pub async fn new_sqlite(
        config: &AppConfig,
        clock: Clock,
        presentation: Arc<dyn PresentationPort>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Self::with_storage(config, storage, clock, presentation).await
    }

    /// Build services on an already opened storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the catalog file cannot be loaded.
    pub async fn with_storage(
        config: &AppConfig,
        storage: Storage,
        clock: Clock,
        presentation: Arc<dyn PresentationPort>,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(load_catalog(config.catalog_path.as_deref()).await?);
        let mut quiz = QuizLoopService::new(
            clock,
            Arc::clone(&storage.progress),
            RegionAssetLoader::new(config.assets_root.clone()),
            presentation,
        );
        if let Some(seed) = config.rng_seed {
            quiz = quiz.with_rng_seed(seed);
        }

        Ok(Self {
            catalog,
            quiz: Arc::new(quiz),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<MapCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn map(&self, id: &MapId) -> Option<&RegionCatalogEntry> {
        self.catalog.get(id)
    }
}
