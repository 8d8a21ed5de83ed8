//! PKZIP archive reading and writing, including ZipCrypto encryption
//! (§4.12, §6.4).

pub mod crypto;
pub mod dostime;
pub mod reader;
pub mod writer;

pub use reader::ZipReader;
pub use writer::{ZipEntryOptions, ZipWriter};
