//! Integration tests covering the container formats end to end.

use rdeflate::checksum::adler32::adler32;
use rdeflate::deflate::{CompressionType, DeflateOptions, InflateOptions};
use rdeflate::gzip::{self, GzipOptions};
use rdeflate::zip::writer::{ZipEntryOptions, ZipWriter};
use rdeflate::zip::ZipReader;
use rdeflate::zlib::{self, ZlibOptions};
use rdeflate::{compress_raw, decompress_raw};

/// Surfaces the crate's `log::debug!`/`log::trace!` output under
/// `cargo test -- --nocapture`; harmless to call more than once per process.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn adler32_of_hello_world_matches_known_value() {
    assert_eq!(adler32(b"Hello, World!"), 0x205E_048A);
}

#[test]
fn repeated_run_of_a_collapses_to_one_match() {
    let tokens = rdeflate::lz77::parse(b"AAAAAAAA", 259);
    assert!(tokens.iter().any(
        |t| matches!(t, rdeflate::lz77::Token::Match { length: 7, distance: 1 })
    ));
}

#[test]
fn gzip_round_trip_preserves_filename() {
    let options = GzipOptions {
        filename: Some("report.csv".to_string()),
        ..Default::default()
    };
    let compressed = gzip::compress(b"col_a,col_b\n1,2\n", &options);
    let members = gzip::decompress_members(&compressed, true).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].filename.as_deref(), Some("report.csv"));
    assert_eq!(members[0].data, b"col_a,col_b\n1,2\n");
}

#[test]
fn zlib_round_trip_of_empty_input_is_valid_framing() {
    let compressed = zlib::compress(b"", DeflateOptions::default());
    let header = ((compressed[0] as u16) << 8) | compressed[1] as u16;
    assert_eq!(header % 31, 0, "CMF/FLG must form a multiple of 31");
    let decompressed = zlib::decompress(&compressed, ZlibOptions::default()).unwrap();
    assert!(decompressed.is_empty());
}

#[test]
fn two_entry_zip_archive_round_trips() {
    let mut writer = ZipWriter::new();
    writer
        .add_file(
            "first.txt",
            b"the first entry's contents",
            (2024, 1, 1, 0, 0, 0),
            &ZipEntryOptions::default(),
        )
        .unwrap();
    writer
        .add_file(
            "second.txt",
            b"the second entry's contents, which differs",
            (2024, 1, 1, 0, 0, 0),
            &ZipEntryOptions::default(),
        )
        .unwrap();
    let archive = writer.finish();

    let reader = ZipReader::new(&archive).unwrap();
    let mut names = reader.file_names();
    names.sort();
    assert_eq!(names, vec!["first.txt", "second.txt"]);

    assert_eq!(
        reader.decompress_file("first.txt", None, true).unwrap(),
        b"the first entry's contents"
    );
    assert_eq!(
        reader.decompress_file("second.txt", None, true).unwrap(),
        b"the second entry's contents, which differs"
    );
}

#[test]
fn password_protected_zip_entry_fails_closed_on_wrong_password() {
    let mut writer = ZipWriter::new();
    let options = ZipEntryOptions {
        compression: CompressionType::Dynamic,
        password: Some(b"correct-password".to_vec()),
    };
    writer
        .add_file("vault.txt", b"classified", (2024, 1, 1, 0, 0, 0), &options)
        .unwrap();
    let archive = writer.finish();

    let reader = ZipReader::new(&archive).unwrap();
    assert_eq!(
        reader
            .decompress_file("vault.txt", Some(b"correct-password"), true)
            .unwrap(),
        b"classified"
    );
    assert!(reader
        .decompress_file("vault.txt", Some(b"incorrect-password"), true)
        .is_err());
}

#[test]
fn raw_deflate_round_trips_across_all_block_types() {
    init_logging();
    let data = b"mixed content: aaaaaaaaaa bbbbbbbbbb the quick brown fox";
    for compression in [CompressionType::Stored, CompressionType::Fixed, CompressionType::Dynamic] {
        let opts = DeflateOptions {
            compression,
            ..Default::default()
        };
        let compressed = compress_raw(data, opts);
        let decompressed = decompress_raw(&compressed, InflateOptions::default()).unwrap();
        assert_eq!(decompressed, data.to_vec(), "compression mode {compression:?}");
    }
}

#[test]
fn gzip_multi_member_stream_decodes_as_concatenation() {
    let a = gzip::compress(b"part one, ", &GzipOptions::default());
    let b = gzip::compress(b"part two.", &GzipOptions::default());
    let mut concatenated = a;
    concatenated.extend_from_slice(&b);
    let decompressed = gzip::decompress(&concatenated, true).unwrap();
    assert_eq!(decompressed, b"part one, part two.".to_vec());
}
