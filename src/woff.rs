//! WOFF1 container unpacking.
//!
//! WOFF1 wraps an sfnt font: a 44-byte header, a directory of 20-byte
//! entries, then per-table data that is either stored raw or zlib
//! compressed. [`woff_to_sfnt`] rebuilds the original sfnt so the rest of
//! the crate only ever parses one layout.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::font::FontError;

const WOFF_SIGNATURE: u32 = u32::from_be_bytes(*b"wOFF");
const WOFF_HEADER_LEN: usize = 44;
const WOFF_DIR_ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_RECORD_LEN: usize = 16;

struct SfntTable {
    tag: u32,
    checksum: u32,
    data: Vec<u8>,
}

/// Unpacks a WOFF1 container into sfnt bytes.
///
/// Tables are inflated when their compressed length is shorter than their
/// original length and copied through otherwise, then laid out 4-byte
/// aligned behind a rebuilt table directory sorted by tag. Checksums are
/// carried over from the container as-is.
pub(crate) fn woff_to_sfnt(bytes: &[u8]) -> Result<Vec<u8>, FontError> {
    if read_u32(bytes, 0)? != WOFF_SIGNATURE {
        return Err(FontError::MalformedWoff("bad signature"));
    }
    let flavor = read_u32(bytes, 4)?;
    let num_tables = read_u16(bytes, 12)? as usize;
    if num_tables == 0 {
        return Err(FontError::MalformedWoff("no tables"));
    }

    let mut tables = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let entry = WOFF_HEADER_LEN + i * WOFF_DIR_ENTRY_LEN;
        let tag = read_u32(bytes, entry)?;
        let offset = read_u32(bytes, entry + 4)? as usize;
        let comp_length = read_u32(bytes, entry + 8)? as usize;
        let orig_length = read_u32(bytes, entry + 12)? as usize;
        let checksum = read_u32(bytes, entry + 16)?;

        if comp_length > orig_length {
            return Err(FontError::MalformedWoff(
                "compressed table longer than original",
            ));
        }
        let raw = bytes
            .get(offset..offset.saturating_add(comp_length))
            .ok_or(FontError::Truncated)?;

        let data = if comp_length < orig_length {
            inflate(raw, orig_length)?
        } else {
            raw.to_vec()
        };
        if data.len() != orig_length {
            return Err(FontError::MalformedWoff(
                "table did not decompress to its declared length",
            ));
        }

        tables.push(SfntTable {
            tag,
            checksum,
            data,
        });
    }
    tables.sort_by_key(|t| t.tag);

    // Binary-search fields of the sfnt header
    let entry_selector = tables.len().ilog2() as u16;
    let search_range = SFNT_RECORD_LEN as u16 * (1 << entry_selector);
    let range_shift = tables.len() as u16 * SFNT_RECORD_LEN as u16 - search_range;

    let mut out = Vec::with_capacity(
        SFNT_HEADER_LEN
            + tables.len() * SFNT_RECORD_LEN
            + tables.iter().map(|t| padded(t.data.len())).sum::<usize>(),
    );
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&search_range.to_be_bytes());
    out.extend_from_slice(&entry_selector.to_be_bytes());
    out.extend_from_slice(&range_shift.to_be_bytes());

    let mut offset = SFNT_HEADER_LEN + tables.len() * SFNT_RECORD_LEN;
    for table in &tables {
        out.extend_from_slice(&table.tag.to_be_bytes());
        out.extend_from_slice(&table.checksum.to_be_bytes());
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        offset += padded(table.data.len());
    }
    for table in &tables {
        out.extend_from_slice(&table.data);
        out.resize(padded(out.len()), 0);
    }

    Ok(out)
}

fn padded(len: usize) -> usize {
    len.div_ceil(4) * 4
}

fn inflate(data: &[u8], orig_length: usize) -> Result<Vec<u8>, FontError> {
    let mut out = Vec::with_capacity(orig_length);
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|_| FontError::MalformedWoff("zlib decompression failed"))?;
    Ok(out)
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, FontError> {
    bytes
        .get(at..at + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_be_bytes)
        .ok_or(FontError::Truncated)
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, FontError> {
    bytes
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or(FontError::Truncated)
}
