//! Catalog data model
//!
//! The catalog lives in the store as:
//! - `show:<id>` hashes and `show:<id>:langs` sets
//! - the `catalog:series` index of show ids
//! - `season:<id>:<n>` sorted sets of `<episode>:<resolution>` members
//! - `episode:season:<id>:<n>:<ep>` hashes holding the magnet and quality
//!
//! [`CatalogWriter`] is the only code that mutates these keys.

pub mod keys;
mod magnet;
mod normalize;
mod reader;
mod writer;

pub use magnet::{append_trackers, is_valid_btih, MagnetError, MagnetLink};
pub use normalize::{normalize_title, show_id_for, title_from_show_id, SHOW_ID_PREFIX};
pub use reader::{similarity, CatalogReader, SearchMatch, ShowMeta, ShowSummary, StreamEntry, Video};
pub use writer::{build_batch, CatalogWriter, IngestOutcome, DEFAULT_RESOLUTION, NOT_AVAILABLE};
