//! ZIP archive reader: central directory parsing, filename lookup, and
//! per-entry decompression with optional ZipCrypto decryption (§6.4).

use super::crypto;
use crate::checksum::crc32::crc32;
use crate::deflate::{self, InflateOptions};
use crate::error::{Error, Result};

const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;
const EOCD_MIN_LEN: usize = 22;
const LOCAL_HEADER_FIXED_LEN: usize = 30;
const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;
const GP_FLAG_ENCRYPTED: u16 = 0x0001;

#[derive(Debug, Clone)]
struct ZipEntry {
    name: String,
    method: u16,
    gp_flag: u16,
    crc: u32,
    compressed_size: u32,
    local_header_offset: u32,
}

pub struct ZipReader<'a> {
    data: &'a [u8],
    entries: Vec<ZipEntry>,
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

fn find_eocd(data: &[u8]) -> Result<usize> {
    if data.len() < EOCD_MIN_LEN {
        return Err(Error::TruncatedInput);
    }
    let search_start = data.len().saturating_sub(EOCD_MIN_LEN + 65535);
    let mut pos = data.len() - EOCD_MIN_LEN;
    loop {
        if read_u32(data, pos) == EOCD_SIG {
            return Ok(pos);
        }
        if pos == search_start {
            break;
        }
        pos -= 1;
    }
    Err(Error::InvalidHeader)
}

impl<'a> ZipReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let eocd = find_eocd(data)?;
        let entry_count = read_u16(data, eocd + 10) as usize;
        let cd_offset = read_u32(data, eocd + 16) as usize;

        crate::error::safety_check!(cd_offset <= data.len(), Error::TruncatedInput);

        let mut entries = Vec::with_capacity(entry_count);
        let mut pos = cd_offset;
        for _ in 0..entry_count {
            crate::error::safety_check!(pos + 46 <= data.len(), Error::TruncatedInput);
            if read_u32(data, pos) != CENTRAL_DIR_HEADER_SIG {
                return Err(Error::InvalidHeader);
            }
            let gp_flag = read_u16(data, pos + 8);
            let method = read_u16(data, pos + 10);
            let crc = read_u32(data, pos + 16);
            let compressed_size = read_u32(data, pos + 20);
            let name_len = read_u16(data, pos + 28) as usize;
            let extra_len = read_u16(data, pos + 30) as usize;
            let comment_len = read_u16(data, pos + 32) as usize;
            let local_header_offset = read_u32(data, pos + 42);

            let name_start = pos + 46;
            crate::error::safety_check!(name_start + name_len <= data.len(), Error::TruncatedInput);
            let name = String::from_utf8_lossy(&data[name_start..name_start + name_len]).into_owned();

            entries.push(ZipEntry {
                name,
                method,
                gp_flag,
                crc,
                compressed_size,
                local_header_offset,
            });

            pos = name_start + name_len + extra_len + comment_len;
        }

        Ok(Self { data, entries })
    }

    pub fn file_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn decompress_file(&self, name: &str, password: Option<&[u8]>, verify: bool) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or(Error::IndexOutOfRange)?;

        log::debug!("ZipReader::decompress_file: {name}");

        let local = entry.local_header_offset as usize;
        crate::error::safety_check!(local + LOCAL_HEADER_FIXED_LEN <= self.data.len(), Error::TruncatedInput);
        let local_name_len = read_u16(self.data, local + 26) as usize;
        let local_extra_len = read_u16(self.data, local + 28) as usize;
        let data_start = local + LOCAL_HEADER_FIXED_LEN + local_name_len + local_extra_len;
        let data_end = data_start + entry.compressed_size as usize;
        crate::error::safety_check!(data_end <= self.data.len(), Error::TruncatedInput);
        let raw = &self.data[data_start..data_end];

        let plain_compressed = if entry.gp_flag & GP_FLAG_ENCRYPTED != 0 {
            let password = password.ok_or(Error::EncryptionRequired)?;
            let (check_byte, plaintext) = crypto::decrypt(password, raw)?;
            let expected_check = (entry.crc >> 24) as u8;
            if check_byte != expected_check {
                return Err(Error::ChecksumMismatch {
                    expected: expected_check as u32,
                    found: check_byte as u32,
                });
            }
            plaintext
        } else {
            raw.to_vec()
        };

        let decompressed = match entry.method {
            METHOD_STORED => plain_compressed,
            METHOD_DEFLATE => deflate::decompress_raw(&plain_compressed, InflateOptions::default())?,
            _ => return Err(Error::UnsupportedFeature("zip compression method other than stored/deflate")),
        };

        if verify {
            let found = crc32(&decompressed);
            if found != entry.crc {
                return Err(Error::ChecksumMismatch {
                    expected: entry.crc,
                    found,
                });
            }
        }

        Ok(decompressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate::CompressionType;
    use crate::zip::writer::{ZipEntryOptions, ZipWriter};

    #[test]
    fn round_trips_an_unencrypted_entry() {
        let mut writer = ZipWriter::new();
        writer
            .add_file(
                "notes.txt",
                b"round trip this please",
                (2024, 6, 1, 12, 0, 0),
                &ZipEntryOptions::default(),
            )
            .unwrap();
        let archive = writer.finish();

        let reader = ZipReader::new(&archive).unwrap();
        let out = reader.decompress_file("notes.txt", None, true).unwrap();
        assert_eq!(out, b"round trip this please");
    }

    #[test]
    fn password_protected_entry_round_trips_and_rejects_wrong_password() {
        let mut writer = ZipWriter::new();
        let options = ZipEntryOptions {
            compression: CompressionType::Dynamic,
            password: Some(b"hunter2".to_vec()),
        };
        writer
            .add_file("secret.txt", b"top secret payload", (2024, 6, 1, 12, 0, 0), &options)
            .unwrap();
        let archive = writer.finish();

        let reader = ZipReader::new(&archive).unwrap();
        let out = reader
            .decompress_file("secret.txt", Some(b"hunter2"), true)
            .unwrap();
        assert_eq!(out, b"top secret payload");

        let wrong = reader.decompress_file("secret.txt", Some(b"wrong"), true);
        assert!(wrong.is_err());

        let missing = reader.decompress_file("secret.txt", None, true);
        assert_eq!(missing, Err(Error::EncryptionRequired));
    }

    #[test]
    fn stored_entry_round_trips() {
        let mut writer = ZipWriter::new();
        let options = ZipEntryOptions {
            compression: CompressionType::Stored,
            password: None,
        };
        writer
            .add_file("raw.bin", &[1, 2, 3, 4, 5], (2024, 6, 1, 12, 0, 0), &options)
            .unwrap();
        let archive = writer.finish();

        let reader = ZipReader::new(&archive).unwrap();
        let out = reader.decompress_file("raw.bin", None, true).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }
}
