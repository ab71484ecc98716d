mod catalog;
mod ids;
mod progress;
mod region;
mod session;
mod summary;

pub use catalog::{
    CatalogError, MapCatalog, RegionCatalogEntry, SUMMARY_KEY_SUFFIX, summary_key,
};
pub use ids::{MapId, ParseIdError, RegionId};
pub use progress::ProgressSnapshot;
pub use region::{Region, RegionError, collect_regions};
pub use session::{SessionState, SessionStateError};
pub use summary::CompletionSummary;
