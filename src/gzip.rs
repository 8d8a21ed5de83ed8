//! gzip container framing: full header, CRC-32 + ISIZE trailer, and
//! multi-member concatenation (§6.3, RFC 1952).

use crate::checksum::crc32::crc32;
use crate::deflate::{self, DeflateOptions, InflateOptions};
use crate::error::{Error, Result};

const MAGIC: [u8; 2] = [0x1F, 0x8B];
const CM_DEFLATE: u8 = 8;

const FLG_FHCRC: u8 = 0x02;
const FLG_FEXTRA: u8 = 0x04;
const FLG_FNAME: u8 = 0x08;
const FLG_FCOMMENT: u8 = 0x10;

/// RFC 1952 §2.3.1 OS byte: "unknown".
const OS_UNKNOWN: u8 = 255;

#[derive(Debug, Clone)]
pub struct GzipOptions {
    pub deflate: DeflateOptions,
    pub filename: Option<String>,
    pub comment: Option<String>,
    /// Modification time in Unix seconds; 0 ("no timestamp available") is
    /// the conventional default when the caller has nothing meaningful to
    /// record.
    pub mtime: u32,
    pub os: u8,
    pub verify: bool,
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            deflate: DeflateOptions::default(),
            filename: None,
            comment: None,
            mtime: 0,
            os: OS_UNKNOWN,
            verify: true,
        }
    }
}

/// Compress `data` into a single-member gzip stream.
pub fn compress(data: &[u8], options: &GzipOptions) -> Vec<u8> {
    log::debug!("gzip::compress: {} bytes", data.len());
    let mut flg = 0u8;
    if options.filename.is_some() {
        flg |= FLG_FNAME;
    }
    if options.comment.is_some() {
        flg |= FLG_FCOMMENT;
    }

    let mut out = Vec::with_capacity(data.len() / 2 + 32);
    out.extend_from_slice(&MAGIC);
    out.push(CM_DEFLATE);
    out.push(flg);
    out.extend_from_slice(&options.mtime.to_le_bytes());
    out.push(0); // XFL: no compression-level hint recorded
    out.push(options.os);

    if let Some(name) = &options.filename {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
    }
    if let Some(comment) = &options.comment {
        out.extend_from_slice(comment.as_bytes());
        out.push(0);
    }

    out.extend_from_slice(&deflate::compress_raw(data, options.deflate));
    out.extend_from_slice(&crc32(data).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out
}

/// Decode one gzip member starting at `data`; returns the decompressed
/// payload plus the number of input bytes it consumed.
fn decode_member(data: &[u8], verify: bool) -> Result<(Vec<u8>, Option<String>, Option<String>, u32, usize)> {
    crate::error::safety_check!(data.len() >= 10, Error::TruncatedInput);
    if data[0..2] != MAGIC {
        return Err(Error::InvalidHeader);
    }
    if data[2] != CM_DEFLATE {
        return Err(Error::UnsupportedFeature("gzip compression method other than DEFLATE"));
    }
    let flg = data[3];
    let mtime = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let mut pos = 10usize;

    if flg & FLG_FEXTRA != 0 {
        crate::error::safety_check!(pos + 2 <= data.len(), Error::TruncatedInput);
        let xlen = u16::from_le_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;
        crate::error::safety_check!(pos + xlen <= data.len(), Error::TruncatedInput);
        pos += xlen;
    }

    let filename = if flg & FLG_FNAME != 0 {
        Some(read_cstring(data, &mut pos)?)
    } else {
        None
    };
    let comment = if flg & FLG_FCOMMENT != 0 {
        Some(read_cstring(data, &mut pos)?)
    } else {
        None
    };

    if flg & FLG_FHCRC != 0 {
        crate::error::safety_check!(pos + 2 <= data.len(), Error::TruncatedInput);
        pos += 2;
    }

    crate::error::safety_check!(pos + 8 <= data.len(), Error::TruncatedInput);
    let (decompressed, consumed) =
        deflate::decoder::decompress_raw_framed(&data[pos..], InflateOptions::default())?;
    let trailer = &data[pos + consumed..];
    crate::error::safety_check!(trailer.len() >= 8, Error::TruncatedInput);

    let crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let isize = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    if verify {
        let found_crc = crc32(&decompressed);
        if found_crc != crc {
            return Err(Error::ChecksumMismatch { expected: crc, found: found_crc });
        }
        let found_size = decompressed.len() as u32;
        if found_size != isize {
            return Err(Error::SizeMismatch { expected: isize, found: found_size });
        }
    }

    let total_consumed = pos + consumed + 8;
    Ok((decompressed, filename, comment, mtime, total_consumed))
}

fn read_cstring(data: &[u8], pos: &mut usize) -> Result<String> {
    let start = *pos;
    let mut end = start;
    while end < data.len() && data[end] != 0 {
        end += 1;
    }
    crate::error::safety_check!(end < data.len(), Error::TruncatedInput);
    let s = String::from_utf8_lossy(&data[start..end]).into_owned();
    *pos = end + 1;
    Ok(s)
}

pub struct GzipMember {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub comment: Option<String>,
    pub mtime: u32,
}

/// Decode every concatenated gzip member in `data`, returning each member's
/// metadata and decompressed payload in stream order (§6.3's multi-member
/// behavior: readers MUST treat a concatenation of gzip streams as the
/// concatenation of their decompressed payloads).
pub fn decompress_members(data: &[u8], verify: bool) -> Result<Vec<GzipMember>> {
    let mut members = Vec::new();
    let mut offset = 0usize;
    while offset < data.len() {
        let (decompressed, filename, comment, mtime, consumed) = decode_member(&data[offset..], verify)?;
        members.push(GzipMember {
            data: decompressed,
            filename,
            comment,
            mtime,
        });
        offset += consumed;
    }
    Ok(members)
}

/// Decode a (possibly multi-member) gzip stream into the concatenation of
/// every member's decompressed payload, discarding per-member metadata.
pub fn decompress(data: &[u8], verify: bool) -> Result<Vec<u8>> {
    let members = decompress_members(data, verify)?;
    let mut out = Vec::new();
    for m in members {
        out.extend(m.data);
    }
    Ok(out)
}
