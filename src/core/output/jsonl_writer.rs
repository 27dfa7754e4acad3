//! JSON Lines (JSONL) output writer.
//!
//! Used for livestreams, where records arrive one at a time and an
//! interrupted run must keep everything written so far.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Appends one JSON object per line, flushing after each record.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> redscrape::Result<()> {
/// use redscrape::core::output::JsonlWriter;
///
/// let mut writer = JsonlWriter::create("stream.jsonl")?;
/// writer.write(&serde_json::json!({"id": "abc"}))?;
/// assert_eq!(writer.count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonlWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    count: usize,
}

impl JsonlWriter {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            count: 0,
        })
    }

    /// Opens `path` for appending, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            count: 0,
        })
    }

    /// Writes one record and flushes it to disk.
    pub fn write<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.count += 1;
        Ok(())
    }

    /// Records written through this writer.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes records to a JSONL file.
///
/// ```jsonl
/// {"author":"u/alice","id":"abc"}
/// {"author":"u/bob","id":"def"}
/// ```
pub fn write_jsonl<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<usize> {
    let mut writer = JsonlWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    Ok(writer.count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader};
    use tempfile::tempdir;

    #[test]
    fn test_write_jsonl_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let records = vec![json!({"id": "a"}), json!({"id": "b"})];

        assert_eq!(write_jsonl(&records, &path).unwrap(), 2);

        let file = std::fs::File::open(&path).unwrap();
        let lines: Vec<String> = BufReader::new(file).lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["id"], "a");
    }

    #[test]
    fn test_flushed_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("live.jsonl");
        let mut writer = JsonlWriter::create(&path).unwrap();

        writer.write(&json!({"id": "a"})).unwrap();
        // Visible before the writer is dropped.
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"id\":\"a\"}\n");
        assert_eq!(writer.path(), path.as_path());
    }

    #[test]
    fn test_append_keeps_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("live.jsonl");
        write_jsonl(&[json!({"id": "a"})], &path).unwrap();

        let mut writer = JsonlWriter::append(&path).unwrap();
        writer.write(&json!({"id": "b"})).unwrap();
        drop(writer);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains('['));
    }
}
