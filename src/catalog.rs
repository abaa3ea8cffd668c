//! The icon list controller.
//!
//! [`IconCatalog`] owns the canonical collection for the active font and a
//! filtered view derived from it, and drives everything the list screen
//! does: the cache-first load policy, case-insensitive search, the inline
//! rename machine, saving to the store, and the gated batch exports.

use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::export::{self, ExportArchive, ExportError, ExportGate, RASTER_SIZE};
use crate::extract::{self, GlyphSource};
use crate::icon::{IconCollection, IconRecord};
use crate::storage::{IconStore, StorageBackend, StoreError};

/// Fallback archive name stem when no font filename is known.
const DEFAULT_ARCHIVE_STEM: &str = "icons";

/// Whether a font context is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogState {
    /// No font loaded; both views are empty.
    #[default]
    Empty,

    /// Canonical and filtered views are populated, from cache or extraction.
    Loaded,
}

/// One open inline rename: which record, and the staged name.
#[derive(Debug, Clone)]
struct RenameEdit {
    code_point: u32,
    buffer: String,
}

/// The list controller for the active font.
///
/// Holding the rename state as a single `Option` makes the at-most-one-open-
/// edit rule structural: beginning a rename replaces whatever was open.
pub struct IconCatalog<S> {
    store: IconStore<S>,
    state: CatalogState,
    file_name: Option<String>,
    canonical: IconCollection,
    /// Indices into `canonical` matching the active query.
    filtered: Vec<usize>,
    query: String,
    edit: Option<RenameEdit>,
    gate: ExportGate,
}

impl<S: StorageBackend> IconCatalog<S> {
    /// Creates an empty catalog over the given store.
    pub fn new(store: IconStore<S>) -> Self {
        Self {
            store,
            state: CatalogState::Empty,
            file_name: None,
            canonical: IconCollection::new(),
            filtered: Vec::new(),
            query: String::new(),
            edit: None,
            gate: ExportGate::new(),
        }
    }

    /// Switches the catalog to a new font context.
    ///
    /// Load policy, in order: a saved icon set for `file_name` wins and
    /// extraction is skipped entirely; otherwise a present `source` is
    /// extracted; otherwise the catalog empties. Any open rename and the
    /// search query are discarded either way.
    pub fn load(
        &mut self,
        file_name: Option<&str>,
        source: Option<&dyn GlyphSource>,
    ) -> CatalogState {
        self.query.clear();
        self.edit = None;
        self.file_name = file_name.map(str::to_string);

        let (records, state) = match (file_name, source) {
            (Some(name), _) if self.store.is_saved(name) => {
                let saved = self.store.load(name);
                info!("loaded {} icons for {name:?} from cache", saved.len());
                (saved, CatalogState::Loaded)
            }
            (name, Some(source)) => {
                let extracted = extract::extract(source);
                info!(
                    "extracted {} icons from {}",
                    extracted.len(),
                    name.unwrap_or("unnamed font")
                );
                (extracted, CatalogState::Loaded)
            }
            _ => (Vec::new(), CatalogState::Empty),
        };

        self.canonical = IconCollection::from_records(records);
        self.state = state;
        self.refilter();
        state
    }

    /// Current load state.
    pub fn state(&self) -> CatalogState {
        self.state
    }

    /// The active font filename, if one is known.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The canonical (unfiltered) records, in font glyph order.
    pub fn records(&self) -> &[IconRecord] {
        self.canonical.as_slice()
    }

    /// The records matching the active query, in canonical order.
    pub fn filtered_records(&self) -> impl Iterator<Item = &IconRecord> {
        self.filtered.iter().filter_map(|&i| self.canonical.get(i))
    }

    /// Number of records in the filtered view.
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Borrows the canonical record with `code_point` mutably, for a detail
    /// session.
    pub fn record_mut(&mut self, code_point: u32) -> Option<&mut IconRecord> {
        let index = self.canonical.position_of(code_point)?;
        self.canonical.get_mut(index)
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Recomputes the filtered view: records whose name contains `text`
    /// case-insensitively. Empty text selects everything. The canonical
    /// collection is never touched.
    pub fn search(&mut self, text: &str) {
        self.query = text.to_string();
        self.refilter();
    }

    /// The active search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.filtered = self
            .canonical
            .iter()
            .enumerate()
            .filter(|(_, record)| needle.is_empty() || record.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
    }

    // ------------------------------------------------------------------
    // Inline rename
    // ------------------------------------------------------------------

    /// Opens a rename on the record with `code_point`, staging its current
    /// name. An already-open rename on another record is closed without
    /// committing. Returns false when no such record exists.
    pub fn begin_rename(&mut self, code_point: u32) -> bool {
        let Some(index) = self.canonical.position_of(code_point) else {
            self.edit = None;
            return false;
        };
        let name = self.canonical.get(index).map(|r| r.name.clone());
        self.edit = name.map(|buffer| RenameEdit { code_point, buffer });
        self.edit.is_some()
    }

    /// The code point of the record currently being renamed.
    pub fn renaming(&self) -> Option<u32> {
        self.edit.as_ref().map(|e| e.code_point)
    }

    /// The staged rename text.
    pub fn rename_buffer(&self) -> Option<&str> {
        self.edit.as_ref().map(|e| e.buffer.as_str())
    }

    /// Replaces the staged rename text. No-op when no rename is open.
    pub fn set_rename_buffer(&mut self, text: &str) {
        if let Some(edit) = &mut self.edit {
            edit.buffer = text.to_string();
        }
    }

    /// Closes the open rename, writing the trimmed staged text to the
    /// record when it is non-empty. Returns true when the name was
    /// actually replaced.
    pub fn commit_rename(&mut self) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };
        let trimmed = edit.buffer.trim();
        if trimmed.is_empty() {
            return false;
        }
        match self.record_mut(edit.code_point) {
            Some(record) => {
                record.name = trimmed.to_string();
                true
            }
            None => false,
        }
    }

    /// Closes the open rename without touching the record.
    pub fn cancel_rename(&mut self) {
        self.edit = None;
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Saves the canonical collection under the active filename.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let Some(name) = self.file_name.clone() else {
            return Err(StoreError::NoActiveFile);
        };
        self.store.save(&name, self.canonical.as_slice())
    }

    /// True if the active font has a saved icon set.
    pub fn is_saved(&self) -> bool {
        self.file_name
            .as_deref()
            .is_some_and(|name| self.store.is_saved(name))
    }

    /// The underlying store, for registry queries.
    pub fn store(&self) -> &IconStore<S> {
        &self.store
    }

    /// The underlying store, mutably, for delete and registry maintenance.
    pub fn store_mut(&mut self) -> &mut IconStore<S> {
        &mut self.store
    }

    // ------------------------------------------------------------------
    // Batch export
    // ------------------------------------------------------------------

    /// Exports every record as a standalone SVG document in one zip.
    ///
    /// Returns [`ExportError::InFlight`] while another batch holds the gate
    /// or its cooldown has not elapsed, and [`ExportError::NoOutput`] for an
    /// empty collection. `now` drives the gate; pass `Instant::now()`.
    pub fn export_svg_archive(&mut self, now: Instant) -> Result<ExportArchive, ExportError> {
        if !self.gate.try_acquire(now) {
            return Err(ExportError::InFlight);
        }
        let result = self.build_svg_archive();
        self.gate.release(now);
        result
    }

    /// Exports every record as a 1024×1024 PNG in one zip.
    ///
    /// Rasterization fans out across records; a record that fails to
    /// convert is logged and dropped from the archive. Gate semantics as
    /// [`Self::export_svg_archive`].
    pub fn export_png_archive(&mut self, now: Instant) -> Result<ExportArchive, ExportError> {
        if !self.gate.try_acquire(now) {
            return Err(ExportError::InFlight);
        }
        let result = self.build_png_archive();
        self.gate.release(now);
        result
    }

    fn build_svg_archive(&self) -> Result<ExportArchive, ExportError> {
        if self.canonical.is_empty() {
            return Err(ExportError::NoOutput);
        }
        let entries: Vec<_> = self
            .canonical
            .iter()
            .map(|record| {
                let document = export::svg::plain_document(record);
                (format!("{}.svg", record.export_stem()), document.into_bytes())
            })
            .collect();
        let bytes = export::archive::pack(&entries)?;
        Ok(ExportArchive {
            file_name: format!("{}-svg.zip", self.archive_stem()),
            bytes,
        })
    }

    fn build_png_archive(&self) -> Result<ExportArchive, ExportError> {
        let entries: Vec<_> = self
            .canonical
            .as_slice()
            .par_iter()
            .filter_map(|record| {
                if record.path_markup.is_empty() || record.bounding_box.is_degenerate() {
                    warn!(
                        "skipping {:?} (U+{:04X}) in PNG export: nothing to draw",
                        record.name, record.code_point
                    );
                    return None;
                }
                let document = export::svg::plain_document(record);
                match export::png::rasterize(&document, RASTER_SIZE) {
                    Ok(bytes) => Some((format!("{}.png", record.export_stem()), bytes)),
                    Err(err) => {
                        warn!(
                            "skipping {:?} (U+{:04X}) in PNG export: {err}",
                            record.name, record.code_point
                        );
                        None
                    }
                }
            })
            .collect();

        if entries.is_empty() {
            return Err(ExportError::NoOutput);
        }
        let bytes = export::archive::pack(&entries)?;
        Ok(ExportArchive {
            file_name: format!("{}-png.zip", self.archive_stem()),
            bytes,
        })
    }

    /// Archive name stem: the active filename with its extension stripped,
    /// or `"icons"` when no filename is known.
    fn archive_stem(&self) -> &str {
        let Some(name) = self.file_name.as_deref() else {
            return DEFAULT_ARCHIVE_STEM;
        };
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        if stem.is_empty() {
            DEFAULT_ARCHIVE_STEM
        } else {
            stem
        }
    }
}
