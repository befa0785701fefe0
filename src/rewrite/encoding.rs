//! Content-Encoding decoding for bodies that must be rewritten.

use std::io::{self, Cursor, Read};

use axum::http::{header, HeaderMap};
use brotli::Decompressor;
use flate2::read::{GzDecoder, ZlibDecoder};

/// The response's `Content-Encoding`, if it is not identity.
pub fn content_encoding(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty() && v != "identity")
}

/// Decode `bytes` according to `encoding` (gzip, deflate or br).
pub fn decode_body(bytes: &[u8], encoding: Option<&str>) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    match encoding {
        None => out.extend_from_slice(bytes),
        Some("gzip") | Some("x-gzip") => {
            GzDecoder::new(Cursor::new(bytes)).read_to_end(&mut out)?;
        }
        Some("deflate") => {
            ZlibDecoder::new(Cursor::new(bytes)).read_to_end(&mut out)?;
        }
        Some("br") => {
            Decompressor::new(Cursor::new(bytes), 4096).read_to_end(&mut out)?;
        }
        Some(other) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported content-encoding: {}", other),
            ))
        }
    }
    Ok(out)
}
