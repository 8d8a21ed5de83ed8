//! Raw DEFLATE compression and decompression (RFC 1951) (§4, §6.1).

pub mod constants;
pub mod decoder;
pub mod encoder;

pub use decoder::decompress_raw;
pub use encoder::compress_raw;

/// Strategy used to encode each DEFLATE block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// BTYPE 00: bytes copied verbatim, no Huffman coding at all.
    Stored,
    /// BTYPE 01: the fixed Huffman tables defined by RFC 1951 §3.2.6.
    Fixed,
    /// BTYPE 10: per-block Huffman tables transmitted in the block header.
    Dynamic,
}

#[derive(Debug, Clone, Copy)]
pub struct DeflateOptions {
    pub compression: CompressionType,
    /// Upper bound on the uncompressed size of each emitted block; large
    /// inputs are split into several blocks so table-construction cost
    /// stays bounded. Ignored for `CompressionType::Stored`, which is
    /// further capped at 65535 bytes per block by the format itself.
    pub block_size: usize,
    /// Lazy-match threshold (§4.4.2): a match shorter than `lazy` is held
    /// for one position to see whether a longer match follows before it is
    /// committed to the token stream. `0` disables lazy matching entirely,
    /// so every match is emitted as soon as it is found. Ignored outside
    /// `CompressionType::Dynamic`, which is the only mode that runs LZ77.
    pub lazy: u32,
}

/// One past [`lz77`](crate::lz77)'s maximum match length: the default holds
/// every match for lookahead, matching this crate's historical always-lazy
/// behavior.
const DEFAULT_LAZY_THRESHOLD: u32 = 259;

impl Default for DeflateOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Dynamic,
            block_size: 1 << 16,
            lazy: DEFAULT_LAZY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InflateOptions {
    /// Expected decompressed size, used only to pre-size the output buffer.
    pub size_hint: Option<usize>,
    pub buffer_type: BufferType,
}

/// Output buffer growth policy for the decoder (§6.5). `Block` is accepted
/// for API symmetry with the encoder's block-size knob but behaves
/// identically to `Adaptive` since the decoder's buffer is not segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferType {
    #[default]
    Adaptive,
    Block,
}
