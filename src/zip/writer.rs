//! ZIP archive writer: local file headers, central directory, and EOCD,
//! with optional per-entry ZipCrypto encryption (§6.4).

use std::time::{SystemTime, UNIX_EPOCH};

use super::crypto::{self, HeaderRng};
use super::dostime;
use crate::bytebuf::ByteBuf;
use crate::checksum::crc32::crc32;
use crate::deflate::{self, CompressionType, DeflateOptions};
use crate::error::Result;

const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;
const VERSION_NEEDED: u16 = 20;
const VERSION_MADE_BY: u16 = 20;
const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;
const GP_FLAG_ENCRYPTED: u16 = 0x0001;

#[derive(Debug, Clone)]
pub struct ZipEntryOptions {
    pub compression: CompressionType,
    pub password: Option<Vec<u8>>,
}

impl Default for ZipEntryOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Dynamic,
            password: None,
        }
    }
}

struct CentralRecord {
    name: Vec<u8>,
    method: u16,
    gp_flag: u16,
    mod_time: u16,
    mod_date: u16,
    crc: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    local_header_offset: u32,
}

pub struct ZipWriter {
    out: ByteBuf,
    records: Vec<CentralRecord>,
    rng: HeaderRng,
}

impl ZipWriter {
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        Self {
            out: ByteBuf::new(),
            records: Vec::new(),
            rng: HeaderRng::seeded(seed),
        }
    }

    /// Append a file entry. `name` is stored as-is (UTF-8, `/`-separated
    /// path conventionally); `mtime` is the civil `(year, month, day, hour,
    /// minute, second)` stamped into the DOS date/time fields.
    pub fn add_file(
        &mut self,
        name: &str,
        data: &[u8],
        mtime: (u16, u8, u8, u8, u8, u8),
        options: &ZipEntryOptions,
    ) -> Result<()> {
        log::debug!("ZipWriter::add_file: {name} ({} bytes)", data.len());

        let (mod_date, mod_time) = dostime::pack(mtime.0, mtime.1, mtime.2, mtime.3, mtime.4, mtime.5);
        let crc = crc32(data);

        let (method, compressed_plain) = match options.compression {
            CompressionType::Stored => (METHOD_STORED, data.to_vec()),
            other => (
                METHOD_DEFLATE,
                deflate::compress_raw(
                    data,
                    DeflateOptions {
                        compression: other,
                        ..Default::default()
                    },
                ),
            ),
        };

        let (gp_flag, compressed_final) = match &options.password {
            Some(password) => {
                let header_random = self.rng.fill();
                let check_byte = (crc >> 24) as u8;
                let encrypted = crypto::encrypt(password, &header_random, check_byte, &compressed_plain);
                (GP_FLAG_ENCRYPTED, encrypted)
            }
            None => (0, compressed_plain),
        };

        let local_header_offset = self.out.len() as u32;
        let name_bytes = name.as_bytes().to_vec();

        self.out.write_u32_le(LOCAL_FILE_HEADER_SIG);
        self.out.write_u16_le(VERSION_NEEDED);
        self.out.write_u16_le(gp_flag);
        self.out.write_u16_le(method);
        self.out.write_u16_le(mod_time);
        self.out.write_u16_le(mod_date);
        self.out.write_u32_le(crc);
        self.out.write_u32_le(compressed_final.len() as u32);
        self.out.write_u32_le(data.len() as u32);
        self.out.write_u16_le(name_bytes.len() as u16);
        self.out.write_u16_le(0); // extra field length
        self.out.extend(&name_bytes);
        self.out.extend(&compressed_final);

        self.records.push(CentralRecord {
            name: name_bytes,
            method,
            gp_flag,
            mod_time,
            mod_date,
            crc,
            compressed_size: compressed_final.len() as u32,
            uncompressed_size: data.len() as u32,
            local_header_offset,
        });

        Ok(())
    }

    /// Emit the central directory and EOCD, returning the complete archive.
    pub fn finish(mut self) -> Vec<u8> {
        let cd_start = self.out.len() as u32;

        for record in &self.records {
            self.out.write_u32_le(CENTRAL_DIR_HEADER_SIG);
            self.out.write_u16_le(VERSION_MADE_BY);
            self.out.write_u16_le(VERSION_NEEDED);
            self.out.write_u16_le(record.gp_flag);
            self.out.write_u16_le(record.method);
            self.out.write_u16_le(record.mod_time);
            self.out.write_u16_le(record.mod_date);
            self.out.write_u32_le(record.crc);
            self.out.write_u32_le(record.compressed_size);
            self.out.write_u32_le(record.uncompressed_size);
            self.out.write_u16_le(record.name.len() as u16);
            self.out.write_u16_le(0); // extra field length
            self.out.write_u16_le(0); // comment length
            self.out.write_u16_le(0); // disk number start
            self.out.write_u16_le(0); // internal attributes
            self.out.write_u32_le(0); // external attributes
            self.out.write_u32_le(record.local_header_offset);
            self.out.extend(&record.name);
        }

        let cd_size = self.out.len() as u32 - cd_start;

        self.out.write_u32_le(EOCD_SIG);
        self.out.write_u16_le(0); // disk number
        self.out.write_u16_le(0); // central directory start disk
        self.out.write_u16_le(self.records.len() as u16);
        self.out.write_u16_le(self.records.len() as u16);
        self.out.write_u32_le(cd_size);
        self.out.write_u32_le(cd_start);
        self.out.write_u16_le(0); // archive comment length

        self.out.into_vec()
    }
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::reader::ZipReader;

    #[test]
    fn writes_a_parseable_two_entry_archive() {
        let mut writer = ZipWriter::new();
        writer
            .add_file("a.txt", b"hello", (2024, 1, 1, 0, 0, 0), &ZipEntryOptions::default())
            .unwrap();
        writer
            .add_file(
                "b.txt",
                b"world, repeated, repeated, repeated",
                (2024, 1, 1, 0, 0, 0),
                &ZipEntryOptions::default(),
            )
            .unwrap();
        let archive = writer.finish();

        let reader = ZipReader::new(&archive).unwrap();
        let mut names = reader.file_names();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
