//! SHA-256 content fingerprints for declaration documents
//!
//! The fingerprint is computed over the raw bytes of the document, not the
//! parsed model, and is stored remotely as a revision tag. The format is a bare
//! lowercase hex digest so that tags written by earlier runs keep matching.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{ConfigError, Result};

/// Size of the chunks fed to the hasher while streaming
pub const CHUNK_SIZE: usize = 8192;

/// Compute the fingerprint of an in-memory document.
pub fn fingerprint_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the fingerprint of everything readable from `reader`.
///
/// The reader is consumed in [`CHUNK_SIZE`] chunks so memory use does not
/// depend on the document size.
pub fn fingerprint_reader<R: Read>(reader: R) -> io::Result<String> {
    stream_chunks(reader, |_| {})
}

/// Read everything from `reader`, returning the bytes and their fingerprint.
///
/// Both come from the same pass over the input, so the fingerprint always
/// covers exactly the returned bytes.
pub fn read_fingerprinted<R: Read>(reader: R) -> io::Result<(Vec<u8>, String)> {
    let mut content = Vec::new();
    let fingerprint = stream_chunks(reader, |chunk| content.extend_from_slice(chunk))?;
    Ok((content, fingerprint))
}

fn stream_chunks<R: Read>(mut reader: R, mut sink: impl FnMut(&[u8])) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
        sink(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the fingerprint of a file on disk.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
    fingerprint_reader(file).map_err(|e| ConfigError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_known_value() {
        assert_eq!(
            fingerprint_bytes(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn fingerprint_has_no_prefix() {
        let fingerprint = fingerprint_bytes(b"name: demo\n");
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn streamed_fingerprint_matches_in_memory() {
        // Spans several chunks and ends mid-chunk
        let content: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let streamed = fingerprint_reader(content.as_slice()).unwrap();
        assert_eq!(streamed, fingerprint_bytes(&content));
    }

    #[test]
    fn read_fingerprinted_returns_hashed_bytes() {
        let content: Vec<u8> = (0..(CHUNK_SIZE + 5)).map(|i| (i % 7) as u8 + b'a').collect();
        let (read, fingerprint) = read_fingerprinted(content.as_slice()).unwrap();
        assert_eq!(read, content);
        assert_eq!(fingerprint, fingerprint_bytes(&content));
    }

    #[test]
    fn single_byte_change_changes_fingerprint() {
        let a = fingerprint_bytes(b"skipCache: true\n");
        let b = fingerprint_bytes(b"skipCache: True\n");
        assert_ne!(a, b);
    }

    #[test]
    fn file_fingerprint_matches_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yaml");
        std::fs::write(&path, "name: demo\n").unwrap();

        assert_eq!(
            fingerprint_file(&path).unwrap(),
            fingerprint_bytes(b"name: demo\n")
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fingerprint_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
