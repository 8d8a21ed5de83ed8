//! DEFLATE block decoding: type dispatch, dynamic table reconstruction, and
//! the literal/length/distance copy loop (§4.9).

use std::sync::OnceLock;

use super::constants::*;
use super::{BufferType, InflateOptions};
use crate::bitio::reader::BitReader;
use crate::error::{Error, Result};
use crate::huffman::HuffmanTable;

fn fixed_tables() -> &'static (HuffmanTable, HuffmanTable) {
    static TABLES: OnceLock<(HuffmanTable, HuffmanTable)> = OnceLock::new();
    TABLES.get_or_init(|| {
        let litlen = HuffmanTable::build(&fixed_litlen_lengths());
        let dist = HuffmanTable::build(&fixed_dist_lengths());
        (litlen, dist)
    })
}

pub fn decompress_raw(data: &[u8], options: InflateOptions) -> Result<Vec<u8>> {
    decompress_raw_framed(data, options).map(|(out, _consumed)| out)
}

/// Like [`decompress_raw`] but also reports how many bytes of `data` the
/// bitstream occupied, rounded up to the next byte boundary. Container
/// formats that pack a byte-aligned trailer (or another member) directly
/// after the DEFLATE payload need this to locate it; [`decompress_raw`]
/// itself has no use for it since callers already know the payload's exact
/// length from framing (stored length, or "everything but the trailer").
pub fn decompress_raw_framed(data: &[u8], options: InflateOptions) -> Result<(Vec<u8>, usize)> {
    log::debug!("decompress_raw: {} input bytes", data.len());

    let initial_capacity = match options.size_hint {
        Some(n) => n,
        None => match options.buffer_type {
            BufferType::Adaptive | BufferType::Block => data.len().saturating_mul(3).max(64),
        },
    };
    let mut out = Vec::with_capacity(initial_capacity);
    let mut reader = BitReader::new(data);

    loop {
        let is_final = reader.read_bits(1)? != 0;
        let btype = reader.read_bits(2)?;
        match btype {
            0b00 => decode_stored_block(&mut reader, &mut out)?,
            0b01 => {
                let (litlen, dist) = fixed_tables();
                decode_huffman_block(&mut reader, &mut out, litlen, dist)?;
            }
            0b10 => decode_dynamic_block(&mut reader, &mut out)?,
            _ => return Err(Error::ReservedBlockType),
        }
        if is_final {
            break;
        }
    }

    reader.align_to_byte();
    log::trace!("decompress_raw: produced {} output bytes", out.len());
    Ok((out, reader.byte_position()))
}

fn decode_stored_block(reader: &mut BitReader, out: &mut Vec<u8>) -> Result<()> {
    reader.align_to_byte();
    let len = reader.read_u16_aligned()?;
    let nlen = reader.read_u16_aligned()?;
    if len != !nlen {
        return Err(Error::InvalidStoredLength);
    }
    let bytes = reader.read_bytes_aligned(len as usize)?;
    out.extend_from_slice(bytes);
    Ok(())
}

fn decode_dynamic_block(reader: &mut BitReader, out: &mut Vec<u8>) -> Result<()> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut cl_lens = [0u8; 19];
    for &sym in &CODE_LENGTH_ORDER[..hclen] {
        cl_lens[sym as usize] = reader.read_bits(3)? as u8;
    }
    let cl_table = HuffmanTable::build(&cl_lens);

    let total = hlit + hdist;
    let mut lens: Vec<u8> = Vec::with_capacity(total);
    while lens.len() < total {
        let sym = reader.read_code(&cl_table)?;
        match sym {
            0..=15 => lens.push(sym as u8),
            16 => {
                let prev = *lens.last().ok_or(Error::InvalidCodeLength)?;
                let repeat = reader.read_bits(2)? + 3;
                push_repeated(&mut lens, prev, repeat as usize, total)?;
            }
            17 => {
                let repeat = reader.read_bits(3)? + 3;
                push_repeated(&mut lens, 0, repeat as usize, total)?;
            }
            18 => {
                let repeat = reader.read_bits(7)? + 11;
                push_repeated(&mut lens, 0, repeat as usize, total)?;
            }
            _ => return Err(Error::InvalidCodeLength),
        }
    }

    let litlen_lens = &lens[..hlit];
    let dist_lens = &lens[hlit..hlit + hdist];
    let litlen_table = HuffmanTable::build(litlen_lens);
    let dist_table = HuffmanTable::build(dist_lens);

    decode_huffman_block(reader, out, &litlen_table, &dist_table)
}

fn push_repeated(lens: &mut Vec<u8>, value: u8, count: usize, total: usize) -> Result<()> {
    if lens.len() + count > total {
        return Err(Error::InvalidCodeLength);
    }
    for _ in 0..count {
        lens.push(value);
    }
    Ok(())
}

fn decode_huffman_block(
    reader: &mut BitReader,
    out: &mut Vec<u8>,
    litlen_table: &HuffmanTable,
    dist_table: &HuffmanTable,
) -> Result<()> {
    loop {
        let symbol = reader.read_code(litlen_table)?;
        if symbol < 256 {
            out.push(symbol as u8);
        } else if symbol == END_OF_BLOCK as u16 {
            return Ok(());
        } else {
            let idx = symbol as usize - 257;
            if idx >= LENGTH_BASE.len() {
                return Err(Error::InvalidCodeLength);
            }
            let extra = reader.read_bits(LENGTH_EXTRA_BITS[idx] as u32)?;
            let length = LENGTH_BASE[idx] as usize + extra as usize;

            let dist_symbol = reader.read_code(dist_table)? as usize;
            if dist_symbol >= DIST_BASE.len() {
                return Err(Error::InvalidCodeLength);
            }
            let extra = reader.read_bits(DIST_EXTRA_BITS[dist_symbol] as u32)?;
            let distance = DIST_BASE[dist_symbol] as usize + extra as usize;

            if distance == 0 || distance > out.len() {
                return Err(Error::IndexOutOfRange);
            }
            copy_match(out, distance, length);
        }
    }
}

/// Copy `length` bytes from `distance` bytes back, one byte at a time so
/// that matches whose distance is shorter than their length (runs) read
/// back through bytes this same call has already appended.
fn copy_match(out: &mut Vec<u8>, distance: usize, length: usize) {
    let start = out.len() - distance;
    out.reserve(length);
    for i in 0..length {
        let byte = out[start + i];
        out.push(byte);
    }
}
