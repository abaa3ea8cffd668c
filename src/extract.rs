//! Glyph extraction: walking a font's glyphs into icon records.
//!
//! Extraction reads through [`GlyphSource`], a narrow view of a parsed font,
//! so everything downstream of it (the catalog, detail sessions, tests) is
//! independent of font internals. [`crate::font::ParsedFont`] is the real
//! implementation; tests stand in fakes.

use log::debug;

use crate::icon::{IconRecord, ViewBox};

/// Outline geometry for one glyph, already in SVG orientation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    /// SVG path `d` data.
    pub path_markup: String,

    /// Tight bounding box around the path.
    pub bounds: ViewBox,
}

/// The capabilities extraction needs from a parsed font.
pub trait GlyphSource {
    /// Number of glyphs in the font.
    fn glyph_count(&self) -> usize;

    /// The Unicode code point mapped to glyph `index`, if any.
    fn code_point(&self, index: usize) -> Option<u32>;

    /// The font's intrinsic name for glyph `index`, if any.
    fn glyph_name(&self, index: usize) -> Option<String>;

    /// The outline of glyph `index`, or `None` when it cannot be drawn.
    fn outline(&self, index: usize) -> Option<GlyphOutline>;
}

/// Walks `source` in glyph order and produces one icon record per usable
/// glyph.
///
/// Glyphs without a code point, or mapped to U+0000, are skipped: they
/// cannot be addressed by the editing model. Glyphs with no drawable
/// outline still produce a record, with empty path markup and a degenerate
/// bounding box, so blank glyphs stay visible in the list.
pub fn extract(source: &dyn GlyphSource) -> Vec<IconRecord> {
    let mut records = Vec::new();
    for index in 0..source.glyph_count() {
        let Some(code_point) = source.code_point(index).filter(|cp| *cp != 0) else {
            debug!("skipping glyph {index}: no code point");
            continue;
        };
        let name = source.glyph_name(index).unwrap_or_default();
        let outline = source.outline(index).unwrap_or_default();
        records.push(IconRecord::new(
            code_point,
            name,
            outline.bounds,
            outline.path_markup,
        ));
    }
    records
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A glyph source backed by plain vectors.
    pub(crate) struct FakeSource {
        pub glyphs: Vec<FakeGlyph>,
    }

    pub(crate) struct FakeGlyph {
        pub code_point: Option<u32>,
        pub name: Option<&'static str>,
        pub outline: Option<GlyphOutline>,
    }

    impl FakeGlyph {
        pub fn mapped(code_point: u32, name: &'static str) -> Self {
            Self {
                code_point: Some(code_point),
                name: Some(name),
                outline: Some(GlyphOutline {
                    path_markup: format!("M0 0L{code_point} 0Z"),
                    bounds: ViewBox::new(0.0, 0.0, code_point as f64, 1.0),
                }),
            }
        }

        pub fn unmapped() -> Self {
            Self {
                code_point: None,
                name: Some("orphan"),
                outline: None,
            }
        }
    }

    impl GlyphSource for FakeSource {
        fn glyph_count(&self) -> usize {
            self.glyphs.len()
        }

        fn code_point(&self, index: usize) -> Option<u32> {
            self.glyphs.get(index).and_then(|g| g.code_point)
        }

        fn glyph_name(&self, index: usize) -> Option<String> {
            self.glyphs
                .get(index)
                .and_then(|g| g.name.map(str::to_string))
        }

        fn outline(&self, index: usize) -> Option<GlyphOutline> {
            self.glyphs.get(index).and_then(|g| g.outline.clone())
        }
    }

    #[test]
    fn skips_glyphs_without_code_points() {
        let source = FakeSource {
            glyphs: vec![
                FakeGlyph::unmapped(),
                FakeGlyph::mapped(65, "a"),
                FakeGlyph::unmapped(),
                FakeGlyph::mapped(66, "b"),
            ],
        };

        let records = extract(&source);
        let points: Vec<_> = records.iter().map(|r| r.code_point).collect();
        assert_eq!(points, [65, 66]);
    }

    #[test]
    fn skips_code_point_zero() {
        let source = FakeSource {
            glyphs: vec![
                FakeGlyph {
                    code_point: Some(0),
                    name: Some("null"),
                    outline: None,
                },
                FakeGlyph::mapped(65, "a"),
            ],
        };

        let records = extract(&source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code_point, 65);
    }

    #[test]
    fn blank_glyph_yields_empty_record() {
        let source = FakeSource {
            glyphs: vec![FakeGlyph {
                code_point: Some(32),
                name: Some("space"),
                outline: None,
            }],
        };

        let records = extract(&source);
        assert_eq!(records.len(), 1);
        assert!(records[0].path_markup.is_empty());
        assert!(records[0].bounding_box.is_degenerate());
    }

    #[test]
    fn missing_name_defaults_to_empty() {
        let source = FakeSource {
            glyphs: vec![FakeGlyph {
                code_point: Some(65),
                name: None,
                outline: None,
            }],
        };

        let records = extract(&source);
        assert_eq!(records[0].name, "");
        assert_eq!(records[0].export_stem(), "icon");
    }

    #[test]
    fn empty_source_extracts_nothing() {
        let source = FakeSource { glyphs: Vec::new() };
        assert!(extract(&source).is_empty());
    }

    #[test]
    fn records_preserve_glyph_order() {
        let source = FakeSource {
            glyphs: vec![
                FakeGlyph::mapped(0x2764, "heart"),
                FakeGlyph::mapped(65, "a"),
                FakeGlyph::mapped(48, "zero"),
            ],
        };

        let names: Vec<_> = extract(&source).into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["heart", "a", "zero"]);
    }
}
