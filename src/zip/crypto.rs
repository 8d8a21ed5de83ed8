//! ZipCrypto (PKWARE traditional encryption) stream cipher (§4.12).

use crate::checksum::crc32::crc32_single_byte;

pub struct ZipCryptoKeys {
    k0: u32,
    k1: u32,
    k2: u32,
}

impl ZipCryptoKeys {
    pub fn from_password(password: &[u8]) -> Self {
        let mut keys = Self {
            k0: 0x1234_5678,
            k1: 0x2345_6789,
            k2: 0x3456_7890,
        };
        for &byte in password {
            keys.update(byte);
        }
        keys
    }

    fn update(&mut self, plaintext_byte: u8) {
        self.k0 = crc32_single_byte(self.k0, plaintext_byte);
        self.k1 = self.k1.wrapping_add(self.k0 & 0xFF);
        self.k1 = self.k1.wrapping_mul(134_775_813).wrapping_add(1);
        self.k2 = crc32_single_byte(self.k2, (self.k1 >> 24) as u8);
    }

    fn keystream_byte(&self) -> u8 {
        let temp = (self.k2 | 2) as u16;
        (temp.wrapping_mul(temp ^ 1) >> 8) as u8
    }

    pub fn encrypt_byte(&mut self, plaintext: u8) -> u8 {
        let cipher = plaintext ^ self.keystream_byte();
        self.update(plaintext);
        cipher
    }

    pub fn decrypt_byte(&mut self, ciphertext: u8) -> u8 {
        let plaintext = ciphertext ^ self.keystream_byte();
        self.update(plaintext);
        plaintext
    }
}

/// Length of the encryption header prepended to each encrypted entry's
/// compressed data.
pub const HEADER_LEN: usize = 12;

/// Encrypt `data` in place (conceptually; returns a new buffer) after a
/// 12-byte header whose last byte carries the high byte of `check_byte`
/// (conventionally the entry's CRC-32) so readers can reject a wrong
/// password before decompressing the whole entry.
pub fn encrypt(password: &[u8], header_random: &[u8; 11], check_byte: u8, data: &[u8]) -> Vec<u8> {
    let mut keys = ZipCryptoKeys::from_password(password);
    let mut out = Vec::with_capacity(HEADER_LEN + data.len());

    for &b in header_random {
        out.push(keys.encrypt_byte(b));
    }
    out.push(keys.encrypt_byte(check_byte));

    for &b in data {
        out.push(keys.encrypt_byte(b));
    }
    out
}

/// Decrypt a ZipCrypto-protected entry. Returns `(check_byte, plaintext)`;
/// callers compare `check_byte` against the expected high CRC byte to
/// detect a wrong password before trusting the decompressed bytes.
pub fn decrypt(password: &[u8], encrypted: &[u8]) -> crate::error::Result<(u8, Vec<u8>)> {
    crate::error::safety_check!(encrypted.len() >= HEADER_LEN, crate::error::Error::TruncatedInput);
    let mut keys = ZipCryptoKeys::from_password(password);

    let mut header = [0u8; HEADER_LEN];
    for (i, &b) in encrypted[..HEADER_LEN].iter().enumerate() {
        header[i] = keys.decrypt_byte(b);
    }
    let check_byte = header[HEADER_LEN - 1];

    let mut plaintext = Vec::with_capacity(encrypted.len() - HEADER_LEN);
    for &b in &encrypted[HEADER_LEN..] {
        plaintext.push(keys.decrypt_byte(b));
    }
    Ok((check_byte, plaintext))
}

/// A small, dependency-free PRNG for the 11 non-verifying encryption header
/// bytes (§5): their only requirement is unpredictability against known
/// plaintext attacks on the keystream, not cryptographic strength, so a
/// xorshift64 generator seeded from wall-clock time is adequate and keeps
/// the crate free of a `rand` dependency nothing else in it needs.
pub struct HeaderRng {
    state: u64,
}

impl HeaderRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn fill(&mut self) -> [u8; 11] {
        let mut out = [0u8; 11];
        let mut i = 0;
        while i < 11 {
            let word = self.next_u64().to_le_bytes();
            for &b in &word {
                if i == 11 {
                    break;
                }
                out[i] = b;
                i += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let password = b"letmein";
        let header = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
        let data = b"the secret contents of this entry";
        let crc_high_byte = 0xAB;

        let encrypted = encrypt(password, &header, crc_high_byte, data);
        let (check_byte, plaintext) = decrypt(password, &encrypted).unwrap();

        assert_eq!(check_byte, crc_high_byte);
        assert_eq!(plaintext, data.to_vec());
    }

    #[test]
    fn wrong_password_yields_wrong_check_byte() {
        let header = [0u8; 11];
        let data = b"payload";
        let encrypted = encrypt(b"correct horse", &header, 0x42, data);
        let (check_byte, _) = decrypt(b"wrong password", &encrypted).unwrap();
        assert_ne!(check_byte, 0x42);
    }

    #[test]
    fn header_rng_fills_all_eleven_bytes_deterministically() {
        let mut rng = HeaderRng::seeded(12345);
        let a = rng.fill();
        let mut rng2 = HeaderRng::seeded(12345);
        let b = rng2.fill();
        assert_eq!(a, b);
    }
}
