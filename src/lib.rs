//! Byte-accurate DEFLATE, zlib, gzip, and PKZIP/ZipCrypto compression and
//! archiving.
//!
//! The LZ77 match finder, canonical Huffman coder, and bit-level codec in
//! [`lz77`], [`huffman`], and [`bitio`] implement RFC 1951's DEFLATE format
//! from first principles; [`zlib`], [`gzip`], and [`zip`] wrap it in their
//! respective container framings.

pub mod bitio;
pub mod bytebuf;
pub mod checksum;
pub mod deflate;
pub mod error;
pub mod gzip;
pub mod huffman;
pub mod lz77;
pub mod zip;
pub mod zlib;

pub use deflate::{compress_raw, decompress_raw, BufferType, CompressionType, DeflateOptions, InflateOptions};
pub use error::{Error, Result};
