//! Canonical Huffman coding: construction, length-limiting, and decode
//! tables (§3.5, §3.6, §4.3, §4.6, §4.7, §4.8).

pub mod canonical;
pub mod heap;
pub mod lengths;
pub mod table;
pub mod tree_transmit;

pub use canonical::build_codes;
pub use lengths::length_limited_code_lengths;
pub use table::HuffmanTable;
pub use tree_transmit::{get_tree_symbols, TreeTransmitSymbol};
