//! Standalone SVG document assembly for icon records.
//!
//! Documents are built by string assembly, the same way the browser app
//! they replace emitted markup: a fixed-size root with the record's
//! viewBox, the outline path, and optionally a transform sandwich and a
//! grid overlay for previews.

use crate::export::RASTER_SIZE;
use crate::icon::{IconRecord, ViewBox, fmt_coord};

const GRID_DIVISIONS: u32 = 10;

/// Assembles the untouched export document for a record: no fill override,
/// no transform. This is what batch archives contain.
pub(crate) fn plain_document(record: &IconRecord) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}" width="{size}" height="{size}"><path d="{}"/></svg>"#,
        record.bounding_box.to_attribute(),
        record.path_markup,
        size = RASTER_SIZE,
    )
}

/// Assembles a document with a fill color and an optional edit transform.
///
/// A transform is wrapped in translations to the bounding-box center and
/// back, so rotation and scale pivot on the glyph's center rather than the
/// viewBox origin. `grid` adds the preview overlay; exports never set it.
pub(crate) fn styled_document(
    record: &IconRecord,
    fill: &str,
    transform: Option<&str>,
    grid: bool,
) -> String {
    let path = format!(r#"<path d="{}" fill="{}"/>"#, record.path_markup, fill);

    let body = match transform {
        Some(transform) => {
            let (cx, cy) = record.bounding_box.center();
            format!(
                r#"<g transform="translate({cx} {cy})"><g transform="{transform}"><g transform="translate({ncx} {ncy})">{path}</g></g></g>"#,
                cx = fmt_coord(cx),
                cy = fmt_coord(cy),
                ncx = fmt_coord(-cx),
                ncy = fmt_coord(-cy),
            )
        }
        None => path,
    };

    let overlay = if grid {
        grid_overlay(&record.bounding_box)
    } else {
        String::new()
    };

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}" width="{size}" height="{size}">{body}{overlay}</svg>"#,
        record.bounding_box.to_attribute(),
        size = RASTER_SIZE,
    )
}

/// Renders the alignment grid over `view_box`: [`GRID_DIVISIONS`] cells in
/// each direction. Degenerate boxes get no grid.
fn grid_overlay(view_box: &ViewBox) -> String {
    if view_box.is_degenerate() {
        return String::new();
    }

    let x0 = view_box.min_x;
    let y0 = view_box.min_y;
    let x1 = view_box.min_x + view_box.width;
    let y1 = view_box.min_y + view_box.height;
    let stroke = view_box.width.max(view_box.height) / 200.0;

    let mut out = format!(
        r##"<g stroke="#888888" stroke-width="{}" opacity="0.5">"##,
        fmt_coord(stroke)
    );
    for i in 0..=GRID_DIVISIONS {
        let t = i as f64 / GRID_DIVISIONS as f64;
        let x = x0 + view_box.width * t;
        let y = y0 + view_box.height * t;
        out.push_str(&format!(
            r#"<line x1="{x}" y1="{y0}" x2="{x}" y2="{y1}"/>"#,
            x = fmt_coord(x),
            y0 = fmt_coord(y0),
            y1 = fmt_coord(y1),
        ));
        out.push_str(&format!(
            r#"<line x1="{x0}" y1="{y}" x2="{x1}" y2="{y}"/>"#,
            x0 = fmt_coord(x0),
            x1 = fmt_coord(x1),
            y = fmt_coord(y),
        ));
    }
    out.push_str("</g>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> IconRecord {
        IconRecord::new(
            65,
            "alpha",
            ViewBox::new(0.0, -100.0, 120.0, 100.0),
            "M0 0L120 -100Z",
        )
    }

    #[test]
    fn plain_document_shape() {
        let doc = plain_document(&sample_record());
        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(doc.contains(r#"viewBox="0 -100 120 100""#));
        assert!(doc.contains(r#"width="1024" height="1024""#));
        assert!(doc.contains(r#"<path d="M0 0L120 -100Z"/>"#));
        assert!(!doc.contains("fill"));
        assert!(!doc.contains("<g"));
    }

    #[test]
    fn styled_identity_has_no_groups() {
        let doc = styled_document(&sample_record(), "#336699", None, false);
        assert!(doc.contains(r##"fill="#336699""##));
        assert!(!doc.contains("<g"));
    }

    #[test]
    fn transform_is_wrapped_in_centering_sandwich() {
        let doc = styled_document(
            &sample_record(),
            "#000000",
            Some("translate(10 0) rotate(90) scale(1)"),
            false,
        );

        // Center of the sample box is (60, -50)
        let to_center = doc.find(r#"transform="translate(60 -50)""#).unwrap();
        let edit = doc.find("rotate(90)").unwrap();
        let back = doc.find(r#"transform="translate(-60 50)""#).unwrap();
        assert!(to_center < edit && edit < back);
    }

    #[test]
    fn grid_overlay_draws_full_lattice() {
        let doc = styled_document(&sample_record(), "#000000", None, true);
        let lines = doc.matches("<line").count();
        assert_eq!(lines, 2 * (GRID_DIVISIONS as usize + 1));
        assert!(doc.contains(r##"stroke="#888888""##));
    }

    #[test]
    fn no_grid_without_request() {
        let doc = styled_document(&sample_record(), "#000000", None, false);
        assert!(!doc.contains("<line"));
    }

    #[test]
    fn degenerate_box_gets_no_grid() {
        let record = IconRecord::new(32, "space", ViewBox::default(), "");
        let doc = styled_document(&record, "#000000", None, true);
        assert!(!doc.contains("<line"));
    }
}
