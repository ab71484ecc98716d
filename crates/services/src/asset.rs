//! Region extraction from SVG map assets.
//!
//! A region is any element whose `class` list contains `state` and which carries
//! both an `id` and a `name` attribute. Anything else is ignored.

use std::path::PathBuf;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use geoquiz_core::model::{Region, RegionCatalogEntry, collect_regions};

use crate::error::AssetLoadError;

/// CSS class marking selectable region shapes.
pub const REGION_CLASS: &str = "state";

/// Loads map assets relative to a root directory.
#[derive(Debug, Clone)]
pub struct RegionAssetLoader {
    root: PathBuf,
}

impl RegionAssetLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path of the asset for a catalog entry.
    #[must_use]
    pub fn asset_path(&self, entry: &RegionCatalogEntry) -> PathBuf {
        self.root.join(entry.asset_path())
    }

    /// Read and parse the regions of a map.
    ///
    /// An asset without any regions is returned as an empty list; deciding that
    /// this is fatal belongs to session start.
    ///
    /// # Errors
    ///
    /// Returns `AssetLoadError` if the file cannot be read or is not valid XML.
    pub async fn load(&self, entry: &RegionCatalogEntry) -> Result<Vec<Region>, AssetLoadError> {
        let path = self.asset_path(entry);
        let svg = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AssetLoadError::Read {
                path: path.clone(),
                source,
            })?;
        let regions = parse_regions(&svg).map_err(|reason| AssetLoadError::Parse {
            path: path.clone(),
            reason,
        })?;
        debug!(path = %path.display(), regions = regions.len(), "loaded map asset");
        Ok(regions)
    }
}

/// Extract `{id, name}` pairs from an SVG document, in document order.
///
/// # Errors
///
/// Returns a description of the XML error if the document is malformed.
pub fn parse_regions(svg: &str) -> Result<Vec<Region>, String> {
    let mut reader = Reader::from_str(svg);
    let mut raw = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element)) => {
                if let Some(pair) = region_attributes(&element) {
                    raw.push(pair);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!("at byte {}: {e}", reader.buffer_position()));
            }
        }
    }

    Ok(collect_regions(raw))
}

fn region_attributes(element: &BytesStart<'_>) -> Option<(Option<String>, Option<String>)> {
    let mut id = None;
    let mut name = None;
    let mut is_region = false;

    for attr in element.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"id" => id = Some(value.into_owned()),
            b"name" => name = Some(value.into_owned()),
            b"class" => is_region = value.split_whitespace().any(|c| c == REGION_CLASS),
            _ => {}
        }
    }

    is_region.then_some((id, name))
}
