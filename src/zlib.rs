//! zlib container framing: CMF/FLG header and Adler-32 trailer (§6.2, RFC 1950).

use crate::checksum::adler32::adler32;
use crate::deflate::{self, CompressionType, DeflateOptions, InflateOptions};
use crate::error::{Error, Result};

const CM_DEFLATE: u8 = 8;
/// CINFO=7 (32K window), giving CMF = 0x78 for the common case.
const CINFO_32K: u8 = 7;

#[derive(Debug, Clone, Copy)]
pub struct ZlibOptions {
    pub deflate: DeflateOptions,
    /// Verify the Adler-32 trailer against the decompressed payload when
    /// decoding; disabling this skips the checksum pass entirely.
    pub verify: bool,
}

impl Default for ZlibOptions {
    fn default() -> Self {
        Self {
            deflate: DeflateOptions::default(),
            verify: true,
        }
    }
}

/// Compress `data` into a zlib stream (CMF/FLG header, raw DEFLATE payload,
/// big-endian Adler-32 trailer).
pub fn compress(data: &[u8], options: DeflateOptions) -> Vec<u8> {
    log::debug!("zlib::compress: {} bytes", data.len());
    let cmf = (CINFO_32K << 4) | CM_DEFLATE;
    let flevel: u8 = match options.compression {
        CompressionType::Stored => 0,
        CompressionType::Fixed => 1,
        CompressionType::Dynamic => 2,
    };
    let mut flg = flevel << 6;
    let check = (((cmf as u16) << 8) | flg as u16) % 31;
    if check != 0 {
        flg += (31 - check) as u8;
    }

    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    out.push(cmf);
    out.push(flg);
    out.extend_from_slice(&deflate::compress_raw(data, options));
    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

/// Decompress a zlib stream, verifying its Adler-32 trailer unless
/// `options.verify` is false.
pub fn decompress(data: &[u8], options: ZlibOptions) -> Result<Vec<u8>> {
    crate::error::safety_check!(data.len() >= 6, Error::TruncatedInput);
    let cmf = data[0];
    let flg = data[1];

    if (((cmf as u16) << 8) | flg as u16) % 31 != 0 {
        return Err(Error::InvalidHeader);
    }
    if cmf & 0x0F != CM_DEFLATE {
        return Err(Error::UnsupportedFeature("zlib compression method other than DEFLATE"));
    }
    if flg & 0x20 != 0 {
        return Err(Error::UnsupportedFeature("zlib preset dictionary"));
    }

    let payload = &data[2..data.len() - 4];
    let trailer = &data[data.len() - 4..];
    let decompressed = deflate::decompress_raw(payload, InflateOptions::default())?;

    if options.verify {
        let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let found = adler32(&decompressed);
        if expected != found {
            return Err(Error::ChecksumMismatch { expected, found });
        }
    }

    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_check_bits_are_valid() {
        let compressed = compress(b"hello zlib", DeflateOptions::default());
        let header = ((compressed[0] as u16) << 8) | compressed[1] as u16;
        assert_eq!(header % 31, 0);
    }

    #[test]
    fn round_trips_with_verification() {
        let data = b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly";
        let compressed = compress(data, DeflateOptions::default());
        let decompressed = decompress(&compressed, ZlibOptions::default()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn empty_input_round_trips() {
        let compressed = compress(b"", DeflateOptions::default());
        let decompressed = decompress(&compressed, ZlibOptions::default()).unwrap();
        assert!(decompressed.is_empty());
    }

    #[test]
    fn corrupted_trailer_is_rejected() {
        let data = b"some payload to checksum";
        let mut compressed = compress(data, DeflateOptions::default());
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF;
        let result = decompress(&compressed, ZlibOptions::default());
        assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));
    }
}
