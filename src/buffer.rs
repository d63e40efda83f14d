use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The fundamental patching primitive: an in-memory line buffer for one
/// source file, mutated in place by line-span replacements.
///
/// Lines retain their terminators, so flushing the buffer reproduces the
/// on-disk bytes everywhere no edit touched. Buffer index `i` corresponds
/// to 1-based source line `i + 1`. Replacements never insert or delete
/// lines, which keeps line numbers held by later edits valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileBuffer {
    /// Path the buffer was loaded from
    source_path: PathBuf,
    /// Lines with their terminators; the final line keeps whatever
    /// terminator it had on disk, possibly none
    lines: Vec<String>,
}

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("line index span [{start}, {end}] out of bounds for {file} ({line_count} lines)")]
    SpanOutOfRange {
        file: PathBuf,
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("inverted line index span [{start}, {end}] in {file}")]
    InvertedSpan {
        file: PathBuf,
        start: usize,
        end: usize,
    },
}

impl SourceFileBuffer {
    /// Read the whole file into a line buffer. One disk read per buffer;
    /// the engine never loads the same path twice in a run.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let source_path = path.into();
        let content = fs::read_to_string(&source_path)?;
        let lines = content.split_inclusive('\n').map(str::to_string).collect();
        Ok(Self { source_path, lines })
    }

    /// Path this buffer was loaded from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Replace the inclusive 0-based line span `[start, end]` with `text`.
    ///
    /// Every line in the span is cleared to a bare newline, then `start` is
    /// overwritten with `text` plus a terminator. The replacement occupies
    /// exactly one line at the original start position and the rest of the
    /// span becomes blank lines.
    pub fn replace_span(&mut self, start: usize, end: usize, text: &str) -> Result<(), BufferError> {
        if start > end {
            return Err(BufferError::InvertedSpan {
                file: self.source_path.clone(),
                start,
                end,
            });
        }
        if end >= self.lines.len() {
            return Err(BufferError::SpanOutOfRange {
                file: self.source_path.clone(),
                start,
                end,
                line_count: self.lines.len(),
            });
        }

        for line in &mut self.lines[start..=end] {
            line.clear();
            line.push('\n');
        }
        self.lines[start] = format!("{text}\n");

        Ok(())
    }

    /// The buffer's current contents as a single string.
    pub fn contents(&self) -> String {
        self.lines.concat()
    }

    /// Write the buffer's contents to `dest` atomically.
    ///
    /// The parent directory must already exist.
    pub fn write_to(&self, dest: &Path) -> Result<(), std::io::Error> {
        atomic_write(dest, self.contents().as_bytes())
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// This ensures crash safety - either the full write succeeds or nothing
/// appears at the destination path.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;

    temp.write_all(content)?;

    // Flush to disk (fsync)
    temp.as_file().sync_all()?;

    // Atomic rename
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
