//! Snapshot encoding detection.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Encoding of a snapshot byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// UTF-8 JSON document
    Json,
    /// Gzip-compressed JSON document
    GzipJson,
}

impl std::fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotFormat::Json => write!(f, "JSON snapshot"),
            SnapshotFormat::GzipJson => write!(f, "gzip JSON snapshot"),
        }
    }
}

/// Gzip magic bytes
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
/// UTF-8 byte order mark
const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

/// Detect snapshot format from a file path.
///
/// # Example
/// ```no_run
/// use blocktext::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("page.snapshot").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SnapshotFormat> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut header = Vec::with_capacity(64);
    reader.take(64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect snapshot format from the leading bytes of a buffer.
///
/// # Returns
/// * `Ok(SnapshotFormat)` for JSON or gzip data
/// * `Err(Error::UnknownFormat)` for anything else, including empty input
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SnapshotFormat> {
    if data.starts_with(GZIP_MAGIC) {
        return Ok(SnapshotFormat::GzipJson);
    }

    let body = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Ok(SnapshotFormat::Json),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if bytes look like a snapshot this crate can decode.
pub fn is_snapshot_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Return the JSON payload of a snapshot, decompressing when needed.
pub fn json_payload(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    match detect_format_from_bytes(data)? {
        SnapshotFormat::Json => Ok(Cow::Borrowed(data.strip_prefix(UTF8_BOM).unwrap_or(data))),
        SnapshotFormat::GzipJson => {
            let mut decoded = Vec::new();
            GzDecoder::new(data)
                .read_to_end(&mut decoded)
                .map_err(|e| Error::Decode(format!("gzip: {}", e)))?;
            if decoded.starts_with(UTF8_BOM) {
                decoded.drain(..UTF8_BOM.len());
            }
            Ok(Cow::Owned(decoded))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_detect_json() {
        assert_eq!(
            detect_format_from_bytes(b"  \n{\"blocks\":{}}").unwrap(),
            SnapshotFormat::Json
        );
        assert_eq!(
            detect_format_from_bytes(b"\xef\xbb\xbf{}").unwrap(),
            SnapshotFormat::Json
        );
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"[1,2]"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_empty() {
        assert!(matches!(
            detect_format_from_bytes(b""),
            Err(Error::UnknownFormat)
        ));
        assert!(!is_snapshot_bytes(b"   "));
    }

    #[test]
    fn test_gzip_payload() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{\"meta\":{}}").unwrap();
        let data = encoder.finish().unwrap();

        assert_eq!(
            detect_format_from_bytes(&data).unwrap(),
            SnapshotFormat::GzipJson
        );
        assert_eq!(json_payload(&data).unwrap().as_ref(), b"{\"meta\":{}}");
    }

    #[test]
    fn test_truncated_gzip() {
        let result = json_payload(&[0x1f, 0x8b, 0x08]);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_json_payload_strips_bom() {
        assert_eq!(json_payload(b"\xef\xbb\xbf{}").unwrap().as_ref(), b"{}");
    }

    #[test]
    fn test_detect_format_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[b' '; 256]).unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        assert_eq!(
            detect_format_from_path(file.path()).unwrap(),
            SnapshotFormat::GzipJson
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\n  {\"blocks\": {}}").unwrap();
        assert_eq!(
            detect_format_from_path(file.path()).unwrap(),
            SnapshotFormat::Json
        );
    }

    #[test]
    fn test_gzip_payload_strips_bom() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"\xef\xbb\xbf{\"blocks\":{}}").unwrap();
        let data = encoder.finish().unwrap();

        assert_eq!(json_payload(&data).unwrap().as_ref(), b"{\"blocks\":{}}");
    }
}
