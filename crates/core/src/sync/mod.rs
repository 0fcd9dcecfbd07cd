//! Catalog sync engine.
//!
//! Rebuilds both search collections from the catalog source:
//! - **Reset**: delete (missing is fine) and recreate each collection
//! - **Streams**: series and VOD listings are fetched and bulk-inserted
//!   independently; a failure in one never cancels the other

mod engine;
mod types;

pub use engine::CatalogSync;
pub use types::{StreamOutcome, SyncError, SyncReport, SyncStage, SyncStatus};
