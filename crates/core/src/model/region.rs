use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::RegionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegionError {
    #[error("region id cannot be empty")]
    EmptyId,

    #[error("region name cannot be empty")]
    EmptyName,
}

/// One identifiable area of a map, as extracted from the map asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    id: RegionId,
    name: String,
}

impl Region {
    /// Creates a region from raw asset attributes.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::EmptyId` or `RegionError::EmptyName` when either
    /// attribute is blank.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, RegionError> {
        let id = RegionId::new(id).map_err(|_| RegionError::EmptyId)?;
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RegionError::EmptyName);
        }
        Ok(Self {
            id,
            name: trimmed.to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// Display label shown to the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builds a region list from raw `(id, name)` pairs.
///
/// Entries with a missing id or name are skipped, and a repeated id keeps its
/// first occurrence. Asset order is preserved.
pub fn collect_regions<I, S, T>(raw: I) -> Vec<Region>
where
    I: IntoIterator<Item = (Option<S>, Option<T>)>,
    S: Into<String>,
    T: Into<String>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|(id, name)| Region::new(id?, name?).ok())
        .filter(|region| seen.insert(region.id().clone()))
        .collect()
}
