//! Font loading on top of skrifa.
//!
//! [`ParsedFont`] sniffs the container format (plain sfnt or WOFF1), unpacks
//! it to sfnt bytes, and reads the tables extraction needs: `maxp` for the
//! glyph count, the Unicode `cmap` subtables for code points, `post` for
//! intrinsic glyph names, and the outline table for geometry. It is the
//! production implementation of [`GlyphSource`].

use kurbo::{BezPath, Shape};
use log::warn;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::raw::tables::cmap::{CmapSubtable, EncodingRecord, PlatformId};
use skrifa::raw::types::GlyphId16;
use skrifa::raw::{ReadError, TableProvider};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use thiserror::Error;

use crate::extract::{GlyphOutline, GlyphSource};
use crate::icon::{ViewBox, fmt_coord};
use crate::woff;

const SFNT_TRUETYPE: u32 = 0x0001_0000;
const SFNT_OTTO: u32 = u32::from_be_bytes(*b"OTTO");
const SFNT_TRUE: u32 = u32::from_be_bytes(*b"true");
const MAGIC_TTCF: u32 = u32::from_be_bytes(*b"ttcf");
const MAGIC_WOFF: u32 = u32::from_be_bytes(*b"wOFF");
const MAGIC_WOFF2: u32 = u32::from_be_bytes(*b"wOF2");

/// Errors from loading font bytes.
#[derive(Debug, Error)]
pub enum FontError {
    /// The leading magic matched no supported container.
    #[error("unrecognized font format (magic {0:#010x})")]
    UnsupportedFormat(u32),

    /// WOFF2 uses Brotli and a transformed glyf table; decode it to
    /// TTF/WOFF1 before uploading.
    #[error("WOFF2 fonts are not supported")]
    Woff2,

    /// The data ended before a complete structure could be read.
    #[error("font data is truncated")]
    Truncated,

    /// The WOFF container contradicts itself.
    #[error("malformed WOFF container: {0}")]
    MalformedWoff(&'static str),

    /// The sfnt tables could not be parsed.
    #[error("failed to read font tables: {0}")]
    Parse(#[from] ReadError),
}

/// A loaded font, ready to serve glyph data.
///
/// Construction does the container unpacking and table walks once; the
/// [`GlyphSource`] methods after that are lookups plus per-glyph outline
/// draws.
#[derive(Debug)]
pub struct ParsedFont {
    data: Vec<u8>,
    num_glyphs: u16,
    code_points: Vec<Option<u32>>,
    names: Vec<Option<String>>,
}

impl ParsedFont {
    /// Loads a font from raw bytes.
    ///
    /// Accepts TTF/OTF sfnt data (including TrueType collections, of which
    /// the first font is used) and WOFF1. WOFF2 and unrecognized data are
    /// typed errors.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontError> {
        let magic = bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_be_bytes)
            .ok_or(FontError::Truncated)?;

        let data = match magic {
            MAGIC_WOFF => woff::woff_to_sfnt(bytes)?,
            MAGIC_WOFF2 => return Err(FontError::Woff2),
            SFNT_TRUETYPE | SFNT_OTTO | SFNT_TRUE | MAGIC_TTCF => bytes.to_vec(),
            other => return Err(FontError::UnsupportedFormat(other)),
        };

        let font = FontRef::from_index(&data, 0)?;
        let num_glyphs = font.maxp()?.num_glyphs();
        let code_points = reverse_cmap(&font, num_glyphs);
        let names = glyph_names(&font, num_glyphs);

        Ok(Self {
            data,
            num_glyphs,
            code_points,
            names,
        })
    }

    /// Number of glyphs in the font, mapped or not.
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }
}

impl GlyphSource for ParsedFont {
    fn glyph_count(&self) -> usize {
        self.num_glyphs as usize
    }

    fn code_point(&self, index: usize) -> Option<u32> {
        self.code_points.get(index).copied().flatten()
    }

    fn glyph_name(&self, index: usize) -> Option<String> {
        self.names.get(index).cloned().flatten()
    }

    fn outline(&self, index: usize) -> Option<GlyphOutline> {
        let font = FontRef::from_index(&self.data, 0).ok()?;
        let glyph = font.outline_glyphs().get(GlyphId::new(index as u32))?;

        let mut pen = SvgPathPen::default();
        glyph
            .draw(
                DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                &mut pen,
            )
            .ok()?;
        pen.finish()
    }
}

/// Maps gid -> lowest Unicode code point, from the font's Unicode cmap
/// subtables (formats 4 and 12).
///
/// Multiple code points can map to one glyph; the lowest wins so names and
/// records stay stable across cmap ordering. A font without a usable cmap
/// degrades to an all-unmapped result.
fn reverse_cmap(font: &FontRef, num_glyphs: u16) -> Vec<Option<u32>> {
    fn is_unicode(record: &&EncodingRecord) -> bool {
        match record.platform_id() {
            PlatformId::Unicode => true,
            PlatformId::Windows => [1, 10].contains(&record.encoding_id()),
            _ => false,
        }
    }

    let mut map = vec![None; num_glyphs as usize];
    let Ok(cmap) = font.cmap() else {
        warn!("font has no readable cmap table");
        return map;
    };
    let offset_data = cmap.offset_data();

    let mut add_to_map = |(code_point, gid): (u32, GlyphId)| {
        if let Some(slot) = map.get_mut(gid.to_u32() as usize) {
            let lowest = match *slot {
                Some(existing) => existing.min(code_point),
                None => code_point,
            };
            *slot = Some(lowest);
        }
    };

    for subtable in cmap
        .encoding_records()
        .iter()
        .filter(is_unicode)
        .filter_map(|rec| rec.subtable(offset_data).ok())
    {
        match subtable {
            CmapSubtable::Format4(subtable) => subtable.iter().for_each(&mut add_to_map),
            CmapSubtable::Format12(subtable) => subtable.iter().for_each(&mut add_to_map),
            _ => (),
        }
    }

    map
}

/// Reads intrinsic glyph names from the `post` table, indexed by gid.
/// Fonts without one (or with a nameless format) read as all-`None`.
fn glyph_names(font: &FontRef, num_glyphs: u16) -> Vec<Option<String>> {
    let Ok(post) = font.post() else {
        return vec![None; num_glyphs as usize];
    };
    (0..num_glyphs)
        .map(|gid| post.glyph_name(GlyphId16::new(gid)).map(str::to_string))
        .collect()
}

// ============================================================================
// Outline pen
// ============================================================================

/// Records pen commands as SVG path data plus a kurbo path for bounds.
///
/// Fonts put Y up; SVG puts Y down. The pen negates Y at record time so the
/// markup and bounding box are plain SVG coordinates and nothing downstream
/// flips anything.
#[derive(Default)]
struct SvgPathPen {
    markup: String,
    bez: BezPath,
}

impl SvgPathPen {
    /// Finishes the pen, or `None` when nothing was drawn.
    fn finish(self) -> Option<GlyphOutline> {
        if self.markup.is_empty() {
            return None;
        }
        let rect = self.bez.bounding_box();
        Some(GlyphOutline {
            path_markup: self.markup,
            bounds: ViewBox::from_corners(rect.x0, rect.y0, rect.x1, rect.y1),
        })
    }
}

impl OutlinePen for SvgPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (x as f64, -y as f64);
        self.markup
            .push_str(&format!("M{} {}", fmt_coord(x), fmt_coord(y)));
        self.bez.move_to((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (x as f64, -y as f64);
        self.markup
            .push_str(&format!("L{} {}", fmt_coord(x), fmt_coord(y)));
        self.bez.line_to((x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (cx0, cy0) = (cx0 as f64, -cy0 as f64);
        let (x, y) = (x as f64, -y as f64);
        self.markup.push_str(&format!(
            "Q{} {} {} {}",
            fmt_coord(cx0),
            fmt_coord(cy0),
            fmt_coord(x),
            fmt_coord(y)
        ));
        self.bez.quad_to((cx0, cy0), (x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (cx0, cy0) = (cx0 as f64, -cy0 as f64);
        let (cx1, cy1) = (cx1 as f64, -cy1 as f64);
        let (x, y) = (x as f64, -y as f64);
        self.markup.push_str(&format!(
            "C{} {} {} {} {} {}",
            fmt_coord(cx0),
            fmt_coord(cy0),
            fmt_coord(cx1),
            fmt_coord(cy1),
            fmt_coord(x),
            fmt_coord(y)
        ));
        self.bez.curve_to((cx0, cy0), (cx1, cy1), (x, y));
    }

    fn close(&mut self) {
        self.markup.push('Z');
        self.bez.close_path();
    }
}
