//! Byte encodings, gzip and digests shared by the providers
//!
//! Everything here is synchronous. Callers move the streaming helpers onto
//! the blocking pool.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use native_fs_core::{Encoding, FsError, HashAlgorithm, Result};
use sha2::Digest;
use std::fmt::Write as _;
use std::io::{self, Read, Write};

/// Read buffer used while hashing
const HASH_BUFFER_SIZE: usize = 10 * 1024;

/// Turn caller-supplied text into the bytes it stands for
pub fn decode_input(content: &str, encoding: Encoding) -> Result<Vec<u8>> {
    match encoding {
        Encoding::Utf8 => Ok(content.as_bytes().to_vec()),
        Encoding::Base64 => decode_base64(content),
    }
}

/// Render bytes as text for the caller
pub fn encode_output(bytes: Vec<u8>, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Utf8 => String::from_utf8(bytes)
            .map_err(|e| FsError::Codec(format!("content is not valid UTF-8: {e}"))),
        Encoding::Base64 => Ok(encode_base64(&bytes)),
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, ignoring embedded whitespace and line breaks
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| FsError::Codec(format!("invalid base64: {e}")))
}

pub fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| FsError::Codec(format!("gzip failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| FsError::Codec(format!("gzip failed: {e}")))
}

/// Gunzip every member of `bytes`; concatenated members decode back to back
pub fn gunzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| FsError::Codec(format!("invalid gzip data: {e}")))?;
    Ok(out)
}

/// Gzip everything from `reader` into `writer`, returning the input length
pub fn gzip_stream<R: Read, W: Write>(mut reader: R, writer: W) -> io::Result<u64> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    let copied = io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(copied)
}

/// Gunzip everything from `reader` into `writer`, returning the output length
pub fn gunzip_stream<R: Read, W: Write>(reader: R, mut writer: W) -> io::Result<u64> {
    let mut decoder = MultiGzDecoder::new(reader);
    let copied = io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;
    Ok(copied)
}

/// Whether a stream error came from malformed compressed input
pub fn is_corrupt_stream(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

/// Digest everything from `reader` with `algorithm`
pub fn digest_reader<R: Read>(reader: R, algorithm: HashAlgorithm) -> io::Result<String> {
    match algorithm {
        HashAlgorithm::Md5 => hex_digest::<md5::Md5, _>(reader),
        HashAlgorithm::Sha1 => hex_digest::<sha1::Sha1, _>(reader),
        HashAlgorithm::Sha224 => hex_digest::<sha2::Sha224, _>(reader),
        HashAlgorithm::Sha256 => hex_digest::<sha2::Sha256, _>(reader),
        HashAlgorithm::Sha384 => hex_digest::<sha2::Sha384, _>(reader),
        HashAlgorithm::Sha512 => hex_digest::<sha2::Sha512, _>(reader),
    }
}

fn hex_digest<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}
