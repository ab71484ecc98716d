use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::MapId;

/// Suffix appended to a map's storage key to address its completion summary.
pub const SUMMARY_KEY_SUFFIX: &str = "_summary";

/// Key under which the completion summary for `storage_key` lives.
#[must_use]
pub fn summary_key(storage_key: &str) -> String {
    format!("{storage_key}{SUMMARY_KEY_SUFFIX}")
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("map id cannot be empty")]
    EmptyId,

    #[error("map `{map}` has an empty {field}")]
    EmptyField { map: String, field: &'static str },

    #[error("duplicate map id `{0}`")]
    DuplicateId(String),

    #[error("storage key `{0}` is used by more than one map")]
    DuplicateStorageKey(String),

    #[error("storage key `{0}` collides with the summary key of another map")]
    SummaryKeyCollision(String),

    #[error("catalog has no maps")]
    Empty,
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// A selectable map dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCatalogEntry {
    id: MapId,
    display_name: String,
    asset_path: String,
    storage_key: String,
    region_noun: String,
}

impl RegionCatalogEntry {
    /// Creates a validated catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if any field is blank.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        asset_path: impl Into<String>,
        storage_key: impl Into<String>,
        region_noun: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let id = MapId::new(id).map_err(|_| CatalogError::EmptyId)?;
        let required = |field: &'static str, value: String| {
            if value.trim().is_empty() {
                Err(CatalogError::EmptyField {
                    map: id.to_string(),
                    field,
                })
            } else {
                Ok(value)
            }
        };

        let display_name = required("display name", display_name.into())?;
        let asset_path = required("asset path", asset_path.into())?;
        let storage_key = required("storage key", storage_key.into())?;
        let region_noun = required("region noun", region_noun.into())?;

        Ok(Self {
            id,
            display_name,
            asset_path,
            storage_key,
            region_noun,
        })
    }

    #[must_use]
    pub fn id(&self) -> &MapId {
        &self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Location of the map asset, relative to the asset root.
    #[must_use]
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// Key under which progress for this map is persisted.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    #[must_use]
    pub fn summary_key(&self) -> String {
        summary_key(&self.storage_key)
    }

    #[must_use]
    pub fn region_noun(&self) -> &str {
        &self.region_noun
    }

    /// Question line shown above the choices.
    ///
    /// Only the noun "country" is used verbatim; everything else reads as "region".
    #[must_use]
    pub fn question_prompt(&self) -> String {
        let noun = if self.region_noun.eq_ignore_ascii_case("country") {
            "country"
        } else {
            "region"
        };
        format!("The highlighted {noun} is...")
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!("Identify the {}", self.region_noun)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Static list of maps the player can choose from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCatalog {
    entries: Vec<RegionCatalogEntry>,
}

impl MapCatalog {
    /// Builds a catalog, checking that ids and storage keys are unique and that no
    /// storage key doubles as another map's summary key.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list, or a duplicate or
    /// collision error.
    pub fn new(entries: Vec<RegionCatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        for entry in &entries {
            if !ids.insert(entry.id()) {
                return Err(CatalogError::DuplicateId(entry.id().to_string()));
            }
            if !keys.insert(entry.storage_key()) {
                return Err(CatalogError::DuplicateStorageKey(
                    entry.storage_key().to_owned(),
                ));
            }
        }

        let summaries: HashSet<String> =
            entries.iter().map(RegionCatalogEntry::summary_key).collect();
        if let Some(entry) = entries
            .iter()
            .find(|entry| summaries.contains(entry.storage_key()))
        {
            return Err(CatalogError::SummaryKeyCollision(
                entry.storage_key().to_owned(),
            ));
        }

        Ok(Self { entries })
    }

    /// The maps shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            ("india", "India", "maps/india.svg", "indiaMapGameProgress", "State"),
            (
                "usa",
                "United States",
                "maps/usa.svg",
                "usaMapGameProgress",
                "State",
            ),
        ]
        .into_iter()
        .filter_map(|(id, name, path, key, noun)| {
            RegionCatalogEntry::new(id, name, path, key, noun).ok()
        })
        .collect();

        Self { entries }
    }

    #[must_use]
    pub fn get(&self, id: &MapId) -> Option<&RegionCatalogEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionCatalogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, key: &str, noun: &str) -> RegionCatalogEntry {
        RegionCatalogEntry::new(id, "Name", "maps/x.svg", key, noun).unwrap()
    }

    #[test]
    fn builtin_catalog_has_india_and_usa() {
        let catalog = MapCatalog::builtin();
        assert_eq!(catalog.len(), 2);
        let india = catalog.get(&MapId::new("india").unwrap()).unwrap();
        assert_eq!(india.storage_key(), "indiaMapGameProgress");
        assert_eq!(india.asset_path(), "maps/india.svg");
        assert!(catalog.get(&MapId::new("mars").unwrap()).is_none());
    }

    #[test]
    fn prompt_uses_country_noun_only_for_countries() {
        assert_eq!(
            entry("w", "k", "Country").question_prompt(),
            "The highlighted country is..."
        );
        assert_eq!(
            entry("w", "k", "State").question_prompt(),
            "The highlighted region is..."
        );
        assert_eq!(entry("w", "k", "State").title(), "Identify the State");
    }

    #[test]
    fn rejects_blank_fields() {
        let err = RegionCatalogEntry::new("india", "India", "", "key", "State").unwrap_err();
        assert_eq!(
            err,
            CatalogError::EmptyField {
                map: "india".into(),
                field: "asset path"
            }
        );
        assert_eq!(
            RegionCatalogEntry::new(" ", "India", "p", "key", "State").unwrap_err(),
            CatalogError::EmptyId
        );
    }

    #[test]
    fn rejects_duplicates() {
        let dup_id = MapCatalog::new(vec![entry("a", "k1", "State"), entry("a", "k2", "State")]);
        assert_eq!(dup_id.unwrap_err(), CatalogError::DuplicateId("a".into()));

        let dup_key = MapCatalog::new(vec![entry("a", "k", "State"), entry("b", "k", "State")]);
        assert_eq!(
            dup_key.unwrap_err(),
            CatalogError::DuplicateStorageKey("k".into())
        );

        assert_eq!(MapCatalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn rejects_storage_key_shadowing_a_summary_key() {
        let err = MapCatalog::new(vec![
            entry("a", "x", "State"),
            entry("b", "x_summary", "State"),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::SummaryKeyCollision("x_summary".into()));

        let ok = MapCatalog::new(vec![entry("a", "x", "State"), entry("b", "x_sum", "State")]);
        assert!(ok.is_ok());
        assert_eq!(entry("a", "x", "State").summary_key(), "x_summary");
    }
}
