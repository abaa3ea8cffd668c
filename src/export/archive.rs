//! In-memory zip packaging for batch exports.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use crate::export::ExportError;

/// Packs `(entry name, bytes)` pairs into a zip archive in memory.
///
/// Entries are stored uncompressed: SVG documents are small and PNG data is
/// already compressed, so deflating again buys nothing.
pub(crate) fn pack(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
