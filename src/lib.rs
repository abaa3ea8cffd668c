//! glyphbench: font glyph → icon extraction, editing, and export.
//!
//! This crate is the engine of an icon workbench: it loads TTF/WOFF font
//! bytes, lifts each mapped glyph into an [`IconRecord`] (name, view box,
//! SVG path markup), and manages the list/detail editing model over those
//! records — search, inline rename, per-icon transform sessions — plus a
//! key-value cache of edited sets and SVG/PNG export of single icons or
//! whole zip archives. Hosts provide the UI, the clipboard, and the
//! download path.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use glyphbench::{IconCatalog, IconStore, MemoryBackend, ParsedFont};
//!
//! # fn run(font_bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let font = ParsedFont::from_bytes(font_bytes)?;
//!
//! let mut catalog = IconCatalog::new(IconStore::new(MemoryBackend::new()));
//! catalog.load(Some("icons.ttf"), Some(&font));
//!
//! // Filter the list and rename an icon inline
//! catalog.search("arrow");
//! if let Some(first) = catalog.filtered_records().next() {
//!     let code_point = first.code_point;
//!     catalog.begin_rename(code_point);
//!     catalog.set_rename_buffer("arrow-left");
//!     catalog.commit_rename();
//! }
//!
//! // Save the edited set; the next load for this filename skips extraction
//! catalog.persist()?;
//!
//! // Batch export everything as SVG
//! let archive = catalog.export_svg_archive(Instant::now())?;
//! assert!(archive.file_name.ends_with("-svg.zip"));
//! # Ok(())
//! # }
//! ```
//!
//! # Detail sessions
//!
//! ```
//! use glyphbench::{DetailSession, Direction, IconRecord, ViewBox};
//!
//! let mut record = IconRecord::new(
//!     0x2764,
//!     "heart",
//!     ViewBox::new(0.0, -100.0, 100.0, 100.0),
//!     "M0 0L100 -100Z",
//! );
//!
//! let mut session = DetailSession::open(&mut record);
//! session.set_color("#e91e63");
//! session.rotate_by(90.0);
//! session.nudge(Direction::Up);
//!
//! let svg = session.export_svg();
//! assert!(svg.contains("rotate(90)"));
//! ```
//!
//! Transform edits live on the session and are never persisted; only
//! renames write through to the record.

mod catalog;
mod detail;
mod export;
mod extract;
mod font;
mod icon;
mod storage;
mod woff;

pub use catalog::{CatalogState, IconCatalog};
pub use detail::{DetailSession, Direction};
pub use export::{ExportArchive, ExportError, ExportGate, RASTER_SIZE};
pub use extract::{GlyphOutline, GlyphSource, extract};
pub use font::{FontError, ParsedFont};
pub use icon::{IconCollection, IconRecord, ViewBox};
pub use storage::{
    FsBackend, IconStore, MemoryBackend, StorageBackend, StoreError, derive_key,
};
