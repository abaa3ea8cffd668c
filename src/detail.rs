//! The per-icon detail session.
//!
//! A [`DetailSession`] borrows one record mutably for the life of the modal
//! and layers transient view state over it: fill color, rotation, scale,
//! nudge offset, and the alignment grid. Only renames write through to the
//! record; everything else dies with the session, so nothing view-only can
//! leak into a saved icon set.

use std::str::FromStr;

use palette::Srgb;

use crate::export::{self, ExportError};
use crate::icon::{IconRecord, fmt_coord};

/// Default fill for a fresh session.
const DEFAULT_COLOR: &str = "#000000";

/// Units moved per nudge.
const NUDGE_STEP: f64 = 10.0;

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 10.0;

/// A nudge direction, in screen orientation (Y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// An edit session over one icon record.
pub struct DetailSession<'a> {
    record: &'a mut IconRecord,
    color: String,
    rotation: f64,
    scale: f64,
    offset: (f64, f64),
    grid: bool,
}

impl<'a> DetailSession<'a> {
    /// Opens a session on `record` with everything reset: black fill, no
    /// rotation, unit scale, zero offset, grid off.
    pub fn open(record: &'a mut IconRecord) -> Self {
        Self {
            record,
            color: DEFAULT_COLOR.to_string(),
            rotation: 0.0,
            scale: 1.0,
            offset: (0.0, 0.0),
            grid: false,
        }
    }

    /// The record under edit.
    pub fn record(&self) -> &IconRecord {
        self.record
    }

    // ------------------------------------------------------------------
    // Transform state
    // ------------------------------------------------------------------

    /// Sets the fill color from a CSS hex string (`#rgb` or `#rrggbb`,
    /// leading `#` optional). Unparseable input leaves the color alone and
    /// returns false.
    pub fn set_color(&mut self, css: &str) -> bool {
        match Srgb::<u8>::from_str(css.trim()) {
            Ok(rgb) => {
                self.color = format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue);
                true
            }
            Err(_) => false,
        }
    }

    /// The current fill color, normalized to `#rrggbb`.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Sets the rotation, normalized into `[0, 360)` degrees.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees.rem_euclid(360.0);
    }

    /// Adds to the rotation; the result stays normalized.
    pub fn rotate_by(&mut self, delta: f64) {
        self.set_rotation(self.rotation + delta);
    }

    /// Current rotation in degrees, in `[0, 360)`.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Sets the scale factor, clamped to `[0.1, 10]`.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Current scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Moves the icon one default step in `direction`.
    pub fn nudge(&mut self, direction: Direction) {
        self.nudge_by(direction, NUDGE_STEP);
    }

    /// Moves the icon `step` units in `direction`.
    pub fn nudge_by(&mut self, direction: Direction, step: f64) {
        match direction {
            Direction::Up => self.offset.1 -= step,
            Direction::Down => self.offset.1 += step,
            Direction::Left => self.offset.0 -= step,
            Direction::Right => self.offset.0 += step,
        }
    }

    /// Current translation offset `(x, y)`.
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Flips the alignment grid and returns the new state. The grid only
    /// ever appears in previews, never in exports.
    pub fn toggle_grid(&mut self) -> bool {
        self.grid = !self.grid;
        self.grid
    }

    /// Whether the alignment grid is on.
    pub fn grid(&self) -> bool {
        self.grid
    }

    /// The combined SVG transform, always in `translate rotate scale`
    /// order. Translation happens in screen space before rotation and
    /// scale distort the local frame, which is what makes arrow-key nudges
    /// feel straight regardless of rotation.
    pub fn transform_attribute(&self) -> String {
        format!(
            "translate({} {}) rotate({}) scale({})",
            fmt_coord(self.offset.0),
            fmt_coord(self.offset.1),
            fmt_coord(self.rotation),
            fmt_coord(self.scale),
        )
    }

    fn is_identity(&self) -> bool {
        self.rotation == 0.0 && self.scale == 1.0 && self.offset == (0.0, 0.0)
    }

    // ------------------------------------------------------------------
    // Name
    // ------------------------------------------------------------------

    /// Renames the record, writing through immediately. Blank input is
    /// refused, same as the list's inline rename.
    pub fn rename(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.record.name = trimmed.to_string();
        true
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Serializes the icon as a standalone SVG document with the session's
    /// fill and transform applied. The grid is never included.
    pub fn export_svg(&self) -> String {
        let transform = (!self.is_identity()).then(|| self.transform_attribute());
        export::svg::styled_document(self.record, &self.color, transform.as_deref(), false)
    }

    /// Like [`Self::export_svg`], but with the grid overlay when it is
    /// toggled on. This is what hosts render into the modal.
    pub fn preview_svg(&self) -> String {
        let transform = (!self.is_identity()).then(|| self.transform_attribute());
        export::svg::styled_document(self.record, &self.color, transform.as_deref(), self.grid)
    }

    /// Rasterizes the exported document to PNG bytes at `px`×`px`. Hosts
    /// pass the rendered element's pixel width.
    pub fn export_png(&self, px: u32) -> Result<Vec<u8>, ExportError> {
        export::png::rasterize(&self.export_svg(), px)
    }

    /// The exported markup for the host's clipboard, or `None` when the
    /// record has no path to copy.
    pub fn copy_svg(&self) -> Option<String> {
        if self.record.path_markup.is_empty() {
            return None;
        }
        Some(self.export_svg())
    }

    /// Suggested download filename, e.g. `heart.svg` or `icon.png`.
    pub fn download_file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.record.export_stem())
    }
}
