//! Loading the map catalog from TOML.
//!
//! Expected schema:
//!
//! ```toml
//! [[maps]]
//! id = "india"
//! display_name = "India"
//! asset_path = "maps/india.svg"
//! storage_key = "indiaMapGameProgress"
//! region_noun = "State"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use geoquiz_core::model::{MapCatalog, RegionCatalogEntry};

use crate::error::CatalogConfigError;

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    maps: Vec<MapEntryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct MapEntryConfig {
    id: String,
    display_name: String,
    asset_path: String,
    storage_key: String,
    #[serde(default = "default_region_noun")]
    region_noun: String,
}

fn default_region_noun() -> String {
    "Region".to_owned()
}

/// Parse and validate a catalog from TOML text.
///
/// # Errors
///
/// Returns `CatalogConfigError::Parse` for malformed TOML and
/// `CatalogConfigError::Invalid` for entries that fail validation.
pub fn parse_catalog(text: &str) -> Result<MapCatalog, CatalogConfigError> {
    let file: CatalogFile = toml::from_str(text)?;
    let entries = file
        .maps
        .into_iter()
        .map(|m| {
            RegionCatalogEntry::new(
                m.id,
                m.display_name,
                m.asset_path,
                m.storage_key,
                m.region_noun,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MapCatalog::new(entries)?)
}

/// Load the catalog from `path`, or fall back to the built-in maps when no path is given.
///
/// # Errors
///
/// Returns `CatalogConfigError` if the file cannot be read or is invalid.
pub async fn load_catalog(path: Option<&Path>) -> Result<MapCatalog, CatalogConfigError> {
    let Some(path) = path else {
        return Ok(MapCatalog::builtin());
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let catalog = parse_catalog(&text)?;
    info!(path = %path.display(), maps = catalog.len(), "loaded map catalog");
    Ok(catalog)
}
