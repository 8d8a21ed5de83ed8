//! Crate-wide error type.
//!
//! One variant per failure kind the format can detect, mirroring the small
//! closed error enum the teacher crate (`LibdeflateError`) uses rather than
//! pulling in an error-derive crate for a handful of variants.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read or a refill ran past the end of the input.
    TruncatedInput,
    /// A container header failed its validity check (zlib CMF/FLG, gzip
    /// magic/CM, ZIP signature).
    InvalidHeader,
    /// A DEFLATE block declared BTYPE == 0b11.
    ReservedBlockType,
    /// A stored block's `LEN` did not complement its `NLEN`.
    InvalidStoredLength,
    /// A Huffman decode step produced a code length exceeding the buffered
    /// bits, or a set of code lengths could not form a valid canonical code.
    InvalidCodeLength,
    /// A trailer checksum did not match the data it covers.
    ChecksumMismatch { expected: u32, found: u32 },
    /// gzip `ISIZE` disagreed with the decoded length.
    SizeMismatch { expected: u32, found: u32 },
    /// A structurally valid but unsupported feature was requested: zlib
    /// FDICT, an unknown gzip CM, a ZIP method other than stored/deflate, or
    /// an unsupported ZIP flag combination.
    UnsupportedFeature(&'static str),
    /// A ZIP entry is flagged encrypted but no password was supplied.
    EncryptionRequired,
    /// The requested archive entry is not present.
    IndexOutOfRange,
    /// An encoder-internal invariant was violated (out-of-range length or
    /// distance reaching token emission). Not reachable through any public
    /// API with valid options; exists so encoder internals can assert their
    /// own preconditions under test.
    BadInputSize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TruncatedInput => write!(f, "truncated input"),
            Error::InvalidHeader => write!(f, "invalid container header"),
            Error::ReservedBlockType => write!(f, "reserved DEFLATE block type"),
            Error::InvalidStoredLength => write!(f, "stored block LEN/NLEN mismatch"),
            Error::InvalidCodeLength => write!(f, "invalid Huffman code length"),
            Error::ChecksumMismatch { expected, found } => write!(
                f,
                "checksum mismatch: expected {expected:#010x}, found {found:#010x}"
            ),
            Error::SizeMismatch { expected, found } => write!(
                f,
                "size mismatch: expected {expected} bytes, decoded {found} bytes"
            ),
            Error::UnsupportedFeature(what) => write!(f, "unsupported feature: {what}"),
            Error::EncryptionRequired => write!(f, "entry is encrypted but no password was given"),
            Error::IndexOutOfRange => write!(f, "no such archive entry"),
            Error::BadInputSize => write!(f, "encoder was given an out-of-range length/distance"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Return `Err($err)` unless `$cond` holds. Keeps call sites reading like
/// the condition they assert rather than an if/return pair.
macro_rules! safety_check {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use safety_check;
