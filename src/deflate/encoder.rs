//! DEFLATE block emission: stored, fixed, and dynamic blocks (§4.5).

use super::constants::*;
use super::{CompressionType, DeflateOptions};
use crate::bitio::writer::BitWriter;
use crate::huffman::{build_codes, get_tree_symbols, length_limited_code_lengths};
use crate::lz77::{self, Token};

const MAX_STORED_BLOCK: usize = 65535;

pub fn compress_raw(data: &[u8], options: DeflateOptions) -> Vec<u8> {
    log::debug!(
        "compress_raw: {} bytes, compression={:?}",
        data.len(),
        options.compression
    );

    let mut writer = BitWriter::new();

    if data.is_empty() {
        write_block(&mut writer, &[], options.compression, options.lazy, true);
        return writer.finish();
    }

    let block_size = match options.compression {
        CompressionType::Stored => MAX_STORED_BLOCK,
        _ => options.block_size.max(1),
    };

    let chunks: Vec<&[u8]> = data.chunks(block_size).collect();
    let last = chunks.len() - 1;
    for (i, chunk) in chunks.into_iter().enumerate() {
        write_block(&mut writer, chunk, options.compression, options.lazy, i == last);
    }

    writer.finish()
}

fn write_block(writer: &mut BitWriter, chunk: &[u8], compression: CompressionType, lazy: u32, is_final: bool) {
    writer.write_bit(is_final as u32);
    match compression {
        CompressionType::Stored => write_stored_block(writer, chunk),
        CompressionType::Fixed => write_fixed_block(writer, chunk, lazy),
        CompressionType::Dynamic => write_dynamic_block(writer, chunk, lazy),
    }
}

fn write_stored_block(writer: &mut BitWriter, chunk: &[u8]) {
    writer.write_bits(0b00, 2, false);
    writer.align_to_byte();
    let len = chunk.len() as u16;
    writer.write_bytes(&len.to_le_bytes());
    writer.write_bytes(&(!len).to_le_bytes());
    writer.write_bytes(chunk);
}

fn write_fixed_block(writer: &mut BitWriter, chunk: &[u8], lazy: u32) {
    writer.write_bits(0b01, 2, false);
    let litlen_lens = fixed_litlen_lengths();
    let dist_lens = fixed_dist_lengths();
    let litlen_codes = build_codes(&litlen_lens);
    let dist_codes = build_codes(&dist_lens);
    emit_tokens(writer, chunk, lazy, &litlen_lens, &litlen_codes, &dist_lens, &dist_codes);
}

fn write_dynamic_block(writer: &mut BitWriter, chunk: &[u8], lazy: u32) {
    writer.write_bits(0b10, 2, false);

    let tokens = lz77::parse(chunk, lazy);

    let mut litlen_freqs = [0u32; NUM_LITLEN_SYMBOLS];
    let mut dist_freqs = [0u32; NUM_DIST_SYMBOLS];
    litlen_freqs[END_OF_BLOCK] = 1;
    for t in &tokens {
        match *t {
            Token::Literal(b) => litlen_freqs[b as usize] += 1,
            Token::Match { length, distance } => {
                let (lsym, _, _) = length_to_symbol(length);
                let (dsym, _, _) = distance_to_symbol(distance);
                litlen_freqs[lsym] += 1;
                dist_freqs[dsym] += 1;
            }
        }
    }
    // A block with no matches still needs a minimally valid distance tree;
    // force one dummy symbol so the table builder never sees an all-zero
    // frequency vector.
    if dist_freqs.iter().all(|&f| f == 0) {
        dist_freqs[0] = 1;
    }

    let litlen_lens = length_limited_code_lengths(&litlen_freqs, 15);
    let dist_lens = length_limited_code_lengths(&dist_freqs, 7);

    let hlit = last_nonzero(&litlen_lens).max(256).min(NUM_LITLEN_SYMBOLS - 1) + 1;
    let hdist = last_nonzero(&dist_lens).max(0).min(NUM_DIST_SYMBOLS - 1) + 1;

    let (tree_symbols, cl_freqs) = get_tree_symbols(&litlen_lens[..hlit], &dist_lens[..hdist]);
    let cl_lens_full = length_limited_code_lengths(&cl_freqs, 7);

    let hclen_count = CODE_LENGTH_ORDER
        .iter()
        .rposition(|&sym| cl_lens_full[sym as usize] != 0)
        .map(|p| p + 1)
        .unwrap_or(4)
        .max(4);

    writer.write_bits((hlit - 257) as u32, 5, false);
    writer.write_bits((hdist - 1) as u32, 5, false);
    writer.write_bits((hclen_count - 4) as u32, 4, false);

    for &sym in &CODE_LENGTH_ORDER[..hclen_count] {
        writer.write_bits(cl_lens_full[sym as usize] as u32, 3, false);
    }

    let cl_codes = build_codes(&cl_lens_full);
    for ts in &tree_symbols {
        let len = cl_lens_full[ts.symbol as usize] as u32;
        writer.write_bits(cl_codes[ts.symbol as usize] as u32, len, true);
        if ts.extra_bits > 0 {
            writer.write_bits(ts.extra_value, ts.extra_bits, false);
        }
    }

    let litlen_codes = build_codes(&litlen_lens);
    let dist_codes = build_codes(&dist_lens);
    emit_token_stream(writer, &tokens, &litlen_lens, &litlen_codes, &dist_lens, &dist_codes);
}

fn last_nonzero(lens: &[u8]) -> usize {
    lens.iter().rposition(|&l| l != 0).unwrap_or(0)
}

fn emit_tokens(
    writer: &mut BitWriter,
    chunk: &[u8],
    lazy: u32,
    litlen_lens: &[u8],
    litlen_codes: &[u16],
    dist_lens: &[u8],
    dist_codes: &[u16],
) {
    let tokens = lz77::parse(chunk, lazy);
    emit_token_stream(writer, &tokens, litlen_lens, litlen_codes, dist_lens, dist_codes);
}

fn emit_token_stream(
    writer: &mut BitWriter,
    tokens: &[Token],
    litlen_lens: &[u8],
    litlen_codes: &[u16],
    dist_lens: &[u8],
    dist_codes: &[u16],
) {
    for t in tokens {
        match *t {
            Token::Literal(b) => {
                write_symbol(writer, litlen_lens, litlen_codes, b as usize);
            }
            Token::Match { length, distance } => {
                let (lsym, lextra, lbits) = length_to_symbol(length);
                write_symbol(writer, litlen_lens, litlen_codes, lsym);
                if lbits > 0 {
                    writer.write_bits(lextra, lbits as u32, false);
                }
                let (dsym, dextra, dbits) = distance_to_symbol(distance);
                write_symbol(writer, dist_lens, dist_codes, dsym);
                if dbits > 0 {
                    writer.write_bits(dextra, dbits as u32, false);
                }
            }
        }
    }
    write_symbol(writer, litlen_lens, litlen_codes, END_OF_BLOCK);
}

fn write_symbol(writer: &mut BitWriter, lens: &[u8], codes: &[u16], symbol: usize) {
    let len = lens[symbol] as u32;
    writer.write_bits(codes[symbol] as u32, len, true);
}
