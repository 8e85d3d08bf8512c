use crate::error::PeaksError;
use crate::util::misc::sample_name_from_path;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// An alignment (BAM) input, either already in memory or on disk
///
#[derive(Debug, Clone)]
pub enum SignalInput {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl SignalInput {
    /// sample name implied by the input file name
    pub fn sample_name(&self) -> Option<Box<str>> {
        match self {
            SignalInput::Bytes(_) => None,
            SignalInput::Path(path) => sample_name_from_path(path),
        }
    }
}

impl From<Vec<u8>> for SignalInput {
    fn from(bytes: Vec<u8>) -> Self {
        SignalInput::Bytes(bytes)
    }
}

impl From<&[u8]> for SignalInput {
    fn from(bytes: &[u8]) -> Self {
        SignalInput::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for SignalInput {
    fn from(path: PathBuf) -> Self {
        SignalInput::Path(path)
    }
}

impl From<&Path> for SignalInput {
    fn from(path: &Path) -> Self {
        SignalInput::Path(path.to_path_buf())
    }
}

impl From<&str> for SignalInput {
    fn from(path: &str) -> Self {
        SignalInput::Path(PathBuf::from(path))
    }
}

///
/// Coerce an input into the in-memory bytes of the BAM file.
///
/// A path must name a regular file, and the result must not be empty.
///
pub fn parse_input(input: SignalInput) -> anyhow::Result<Vec<u8>> {
    let bytes = match input {
        SignalInput::Bytes(bytes) => bytes,
        SignalInput::Path(path) => {
            if !path.is_file() {
                return Err(PeaksError::BadInput(format!("{:?} is not a file", path)).into());
            }
            std::fs::read(&path).with_context(|| format!("failed to read {:?}", path))?
        }
    };

    if bytes.is_empty() {
        return Err(PeaksError::BadInput("input is empty".to_string()).into());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn is_bad_input(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<PeaksError>(), Some(PeaksError::BadInput(_)))
    }

    #[test]
    fn bytes_pass_through() {
        let bytes = parse_input(SignalInput::from(&b"BAM\x01"[..])).unwrap();
        assert_eq!(bytes, b"BAM\x01");
    }

    #[test]
    fn path_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"BAM\x01rest").unwrap();
        let bytes = parse_input(SignalInput::from(file.path())).unwrap();
        assert_eq!(bytes, b"BAM\x01rest");
    }

    #[test]
    fn directory_is_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_input(SignalInput::from(dir.path())).unwrap_err();
        assert!(is_bad_input(&err));
    }

    #[test]
    fn missing_path_is_bad_input() {
        let err = parse_input(SignalInput::from("/nonexistent/sample.bam")).unwrap_err();
        assert!(is_bad_input(&err));
    }

    #[test]
    fn empty_bytes_are_bad_input() {
        let err = parse_input(SignalInput::Bytes(vec![])).unwrap_err();
        assert!(is_bad_input(&err));
    }

    #[test]
    fn sample_name_from_input() {
        let input = SignalInput::from("/data/K562_H3K27ac.rep1.bam");
        assert_eq!(input.sample_name().as_deref(), Some("K562_H3K27ac"));
        assert_eq!(SignalInput::Bytes(vec![1]).sample_name(), None);
    }
}
