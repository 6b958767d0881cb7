//! Fetching the raw dataset.
//!
//! The source file contains bytes outside UTF-8, so the body is decoded as
//! ISO-8859-1: every byte becomes the code point with the same value.

use std::fs;
use std::io::Write;
use std::path::Path;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Result;

/// Anything that can hand back the raw dataset bytes
pub trait Source {
    fn fetch_bytes(&self) -> Result<Vec<u8>>;

    /// Human readable origin, used in log lines
    fn describe(&self) -> String;
}

/// Single blocking GET against a fixed URL. Non-2xx responses are errors.
///
/// The request never times out; a stalled server blocks the run.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(None).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Source for HttpSource {
    fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Decode bytes as Latin-1
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Keep the first `max_chars` characters. A line cut in half stays cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Fetch, decode and truncate
pub fn fetch_text(source: &dyn Source, max_chars: usize) -> Result<String> {
    let bytes = source.fetch_bytes()?;
    info!(source = %source.describe(), bytes = bytes.len(), "fetched dataset");

    let decoded = decode_latin1(&bytes);
    let text = truncate_chars(&decoded, max_chars);
    if text.len() < decoded.len() {
        debug!(kept = max_chars, "truncated dataset");
    }
    Ok(text.to_string())
}

/// Uniquely named file the fetched text is staged through. Deleted on drop,
/// so an existing file is never overwritten or removed.
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create `data*.tsv` in `dir`, or in the system temp dir when `None`
    pub fn create(dir: Option<&Path>, contents: &str) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("data").suffix(".tsv");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(self.path())?)
    }
}

/// Round-trip text through a scratch file, or pass it through untouched
pub fn stage(text: String, enabled: bool, dir: Option<&Path>) -> Result<String> {
    if !enabled {
        return Ok(text);
    }
    let file = ScratchFile::create(dir, &text)?;
    debug!(path = %file.path().display(), "staged dataset through scratch file");
    file.read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct StaticSource(Vec<u8>);

    impl Source for StaticSource {
        fn fetch_bytes(&self) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSource;

    impl Source for FailingSource {
        fn fetch_bytes(&self) -> Result<Vec<u8>> {
            Err(PipelineError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn test_decode_latin1_keeps_high_bytes() {
        // "Ros\xe9" and a non-breaking space
        let decoded = decode_latin1(&[b'R', b'o', b's', 0xE9, 0xA0]);
        assert_eq!(decoded, "Ros\u{e9}\u{a0}");
        assert_eq!(decoded.chars().count(), 5);
    }

    #[test]
    fn test_truncate_chars_boundary() {
        let long = "x".repeat(1600);
        assert_eq!(truncate_chars(&long, 1500).chars().count(), 1500);

        let short = "abc";
        assert_eq!(truncate_chars(short, 1500), "abc");

        let exact = "y".repeat(1500);
        assert_eq!(truncate_chars(&exact, 1500).len(), 1500);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "\u{e9}".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(cut.len(), 8);
    }

    #[test]
    fn test_fetch_text_truncates_and_leaves_partial_line() {
        let mut body = Vec::new();
        for i in 0..200 {
            body.extend_from_slice(format!("row{}\tvalue\n", i).as_bytes());
        }
        let text = fetch_text(&StaticSource(body), 1500).unwrap();
        assert_eq!(text.chars().count(), 1500);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_fetch_text_propagates_errors() {
        let err = fetch_text(&FailingSource, 1500).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_http_source_builds_without_timeout() {
        let source = HttpSource::new("http://localhost:8080/data.tsv").unwrap();
        assert_eq!(source.url(), "http://localhost:8080/data.tsv");
        assert_eq!(source.describe(), source.url());
    }

    #[test]
    fn test_scratch_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let file = ScratchFile::create(Some(dir.path()), "a\tb\n").unwrap();
            assert_eq!(file.read().unwrap(), "a\tb\n");
            assert!(file.path().starts_with(dir.path()));
            file.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_file_leaves_existing_data_tsv_alone() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("data.tsv");
        fs::write(&existing, "keep me").unwrap();

        let staged = stage("x\ty\n".to_string(), true, Some(dir.path())).unwrap();
        assert_eq!(staged, "x\ty\n");
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_stage_round_trips_latin1_text() {
        let dir = tempfile::tempdir().unwrap();
        let text = decode_latin1(&[b'A', 0xE9, b'\t', b'B']);
        let staged = stage(text.clone(), true, Some(dir.path())).unwrap();
        assert_eq!(staged, text);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        assert_eq!(stage(text.clone(), false, Some(dir.path())).unwrap(), text);
    }
}
