//! Export artifacts: standalone SVG documents, PNG rasterization, and zip
//! packaging, plus the gate that keeps batch exports from stacking up.

pub(crate) mod archive;
pub(crate) mod png;
pub(crate) mod svg;

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Canvas side length for exported documents and batch rasterization.
pub const RASTER_SIZE: u32 = 1024;

/// How long the export gate stays closed after a batch finishes.
pub(crate) const EXPORT_COOLDOWN: Duration = Duration::from_secs(3);

/// A finished batch export: the zip bytes and the filename to offer for
/// download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArchive {
    /// Suggested archive filename, e.g. `icons-svg.zip`.
    pub file_name: String,

    /// The zip file contents.
    pub bytes: Vec<u8>,
}

/// Errors from export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A batch export is already running or cooling down.
    #[error("an export is already in progress")]
    InFlight,

    /// Nothing could be converted, so there is no archive to produce.
    #[error("no icons could be exported")]
    NoOutput,

    /// The assembled SVG markup was rejected by the renderer.
    #[error("SVG markup could not be parsed")]
    InvalidMarkup,

    /// A render surface could not be allocated at the requested size.
    #[error("could not allocate a {0}x{0} render surface")]
    Surface(u32),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Zip packaging failed.
    #[error("zip packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive buffer could not be written.
    #[error("archive write failed: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// ExportGate
// ============================================================================

/// Admission control for batch exports.
///
/// At most one export holds the gate, and after it releases the gate stays
/// closed for [`EXPORT_COOLDOWN`] so a second click cannot immediately kick
/// off the same batch. Time is passed in by the caller, which keeps tests
/// off the wall clock.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    busy: bool,
    cooldown_until: Option<Instant>,
}

impl ExportGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate at `now`. Returns false while an export holds it or
    /// the cooldown from the previous one has not elapsed.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.busy {
            return false;
        }
        if let Some(until) = self.cooldown_until {
            if now < until {
                return false;
            }
        }
        self.busy = true;
        true
    }

    /// Releases the gate at `now` and starts the cooldown window.
    pub fn release(&mut self, now: Instant) {
        self.busy = false;
        self.cooldown_until = Some(now + EXPORT_COOLDOWN);
    }

    /// True while an export holds the gate.
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
