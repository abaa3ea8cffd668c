//! Icon record types shared by extraction, editing, persistence, and export.
//!
//! An [`IconRecord`] is one glyph lifted out of a font: its code point, a
//! display name, the tight view window around its outline, and the SVG path
//! markup of the outline itself. Records serialize to the camelCase JSON
//! layout used by the persistence store.

use serde::{Deserialize, Serialize};

/// Formats a coordinate with at most two decimal digits, trimming trailing
/// zeros so path markup stays compact (`12.5` rather than `12.50`, `7`
/// rather than `7.00`).
pub(crate) fn fmt_coord(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Collapse negative zero so tiny negatives don't print as "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

// ============================================================================
// ViewBox
// ============================================================================

/// The SVG view window around a glyph outline.
///
/// Stored as `(minX, minY, width, height)`, the same shape as the SVG
/// `viewBox` attribute. Values are in the font's design units after the
/// Y axis has been flipped to SVG orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBox {
    /// Left edge of the window.
    pub min_x: f64,
    /// Top edge of the window.
    pub min_y: f64,
    /// Width of the window.
    pub width: f64,
    /// Height of the window.
    pub height: f64,
}

impl ViewBox {
    /// Creates a view box from its position and dimensions.
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Creates a view box from opposite corners `(x0, y0)` and `(x1, y1)`.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0,
            min_y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Returns the center point of the window.
    pub fn center(&self) -> (f64, f64) {
        (
            self.min_x + self.width / 2.0,
            self.min_y + self.height / 2.0,
        )
    }

    /// Returns true if the window has no area (blank glyphs).
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Renders the `viewBox` attribute value, e.g. `"0 -12.5 100 112.5"`.
    pub fn to_attribute(&self) -> String {
        format!(
            "{} {} {} {}",
            fmt_coord(self.min_x),
            fmt_coord(self.min_y),
            fmt_coord(self.width),
            fmt_coord(self.height)
        )
    }
}

// ============================================================================
// IconRecord
// ============================================================================

/// A single glyph extracted from a font, in editable form.
///
/// Records are what the catalog lists, what detail sessions edit, and what
/// the store persists. Transient edit state (open rename buffers, transform
/// values) never lives here; only the name survives an edit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconRecord {
    /// The Unicode code point the glyph is mapped from. Always non-zero;
    /// unmapped glyphs are skipped at extraction.
    pub code_point: u32,

    /// Display name. Defaults to the glyph's intrinsic name from the font,
    /// or the empty string when the font carries none.
    pub name: String,

    /// Tight view window around the outline.
    pub bounding_box: ViewBox,

    /// SVG path `d` data for the outline. Empty for blank glyphs.
    pub path_markup: String,
}

impl IconRecord {
    /// Creates a record from its parts.
    pub fn new(
        code_point: u32,
        name: impl Into<String>,
        bounding_box: ViewBox,
        path_markup: impl Into<String>,
    ) -> Self {
        Self {
            code_point,
            name: name.into(),
            bounding_box,
            path_markup: path_markup.into(),
        }
    }

    /// The stem used for export file names: the icon's name, or `"icon"`
    /// when it has none.
    pub fn export_stem(&self) -> &str {
        if self.name.is_empty() {
            "icon"
        } else {
            &self.name
        }
    }
}

// ============================================================================
// IconCollection
// ============================================================================

/// An ordered set of icon records, in font glyph order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconCollection {
    records: Vec<IconRecord>,
}

impl IconCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Creates a collection from a vector of records.
    pub fn from_records(records: Vec<IconRecord>) -> Self {
        Self { records }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records as a slice.
    pub fn as_slice(&self) -> &[IconRecord] {
        &self.records
    }

    /// Returns the record at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&IconRecord> {
        self.records.get(index)
    }

    /// Returns a mutable record at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut IconRecord> {
        self.records.get_mut(index)
    }

    /// Finds the position of the record with the given code point.
    pub fn position_of(&self, code_point: u32) -> Option<usize> {
        self.records.iter().position(|r| r.code_point == code_point)
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> impl Iterator<Item = &IconRecord> {
        self.records.iter()
    }
}

impl IntoIterator for IconCollection {
    type Item = IconRecord;
    type IntoIter = std::vec::IntoIter<IconRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a IconCollection {
    type Item = &'a IconRecord;
    type IntoIter = std::slice::Iter<'a, IconRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
