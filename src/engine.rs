//! Source patch engine - applies macro translations to an in-memory mirror
//! of the source tree and flushes every touched file exactly once
//!
//! The engine is a two-phase batch transform. Phase one walks the
//! translation mapping in order, lazily loading each referenced file into a
//! [`SourceFileBuffer`] on first use and applying line-span replacements in
//! place. Phase two mirrors each touched file's path under the output root
//! and writes the buffer atomically. Files no qualifying macro referenced
//! are never read and never appear in the output tree.
//!
//! Edits are applied in the mapping's iteration order. Overlapping spans in
//! the same file are not detected; the later edit wins on the overlap.

use crate::buffer::{BufferError, SourceFileBuffer};
use crate::location::{LocationError, SourceLocation};
use crate::provider::TranslationMap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of processing a single translation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TranslateOutcome should be checked for skips worth reporting"]
pub enum TranslateOutcome {
    /// The macro's definition span was replaced in its file buffer
    Applied {
        name: String,
        file: PathBuf,
        line: usize,
    },
    /// No translation was available; the source is left untouched
    Untranslated { name: String },
    /// The definition lies outside the input tree (system header or
    /// generated file); skipped, worth a warning
    OutsideTree { name: String, file: PathBuf },
}

/// Errors that abort a patch run. There is no retry and no rollback:
/// output files written before the failure remain on disk.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot patch '{name}': {source}")]
    Span { name: String, source: BufferError },

    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Applies a [`TranslationMap`] to the tree under `src_root`, mirroring
/// touched files under `out_root`.
///
/// One engine instance is one run: buffers are private to it and each
/// referenced file is read at most once for the engine's lifetime.
#[derive(Debug)]
pub struct PatchEngine {
    src_root: PathBuf,
    out_root: PathBuf,
    /// Touched-file buffers in the order they were first loaded; the flush
    /// phase writes them in this order
    buffers: Vec<SourceFileBuffer>,
    by_path: HashMap<PathBuf, usize>,
}

impl PatchEngine {
    pub fn new(src_root: impl Into<PathBuf>, out_root: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
            out_root: out_root.into(),
            buffers: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Apply every entry of `translations` to the in-memory buffers, in
    /// mapping order.
    ///
    /// Returns one outcome per entry. Untranslated macros and macros
    /// defined outside the source root are skipped without touching any
    /// file. Unreadable files, malformed locations, and out-of-range spans
    /// abort the run.
    pub fn apply(
        &mut self,
        translations: &TranslationMap,
    ) -> Result<Vec<TranslateOutcome>, PatchError> {
        let mut outcomes = Vec::with_capacity(translations.len());

        for entry in translations {
            let mac = &entry.macro_def;

            let translation = match &entry.translation {
                Some(text) => text,
                None => {
                    outcomes.push(TranslateOutcome::Untranslated {
                        name: mac.name.clone(),
                    });
                    continue;
                }
            };

            let start = SourceLocation::parse(&mac.definition_location)?;
            let end = SourceLocation::parse(&mac.end_definition_location)?;

            if !start.file.starts_with(&self.src_root) {
                outcomes.push(TranslateOutcome::OutsideTree {
                    name: mac.name.clone(),
                    file: start.file,
                });
                continue;
            }

            let buffer = self.buffer_for(&start.file)?;
            buffer
                .replace_span(start.line_index(), end.line_index(), translation)
                .map_err(|source| PatchError::Span {
                    name: mac.name.clone(),
                    source,
                })?;

            outcomes.push(TranslateOutcome::Applied {
                name: mac.name.clone(),
                file: start.file,
                line: start.line,
            });
        }

        Ok(outcomes)
    }

    /// Fetch the buffer for `path`, reading the file on first reference.
    fn buffer_for(&mut self, path: &Path) -> Result<&mut SourceFileBuffer, PatchError> {
        if let Some(&idx) = self.by_path.get(path) {
            return Ok(&mut self.buffers[idx]);
        }

        let buffer = SourceFileBuffer::load(path).map_err(|source| PatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let idx = self.buffers.len();
        self.by_path.insert(path.to_path_buf(), idx);
        self.buffers.push(buffer);
        Ok(&mut self.buffers[idx])
    }

    /// Touched-file buffers in the order they were first loaded.
    pub fn buffers(&self) -> impl Iterator<Item = &SourceFileBuffer> {
        self.buffers.iter()
    }

    /// Write every touched buffer to its mirrored path under the output
    /// root, creating parent directories as needed.
    ///
    /// Each file is written once, atomically. Returns the written paths in
    /// write order. A failure mid-flush aborts with earlier files already
    /// on disk.
    pub fn flush(self) -> Result<Vec<PathBuf>, PatchError> {
        let mut written = Vec::with_capacity(self.buffers.len());

        for buffer in &self.buffers {
            let rel = buffer
                .source_path()
                .strip_prefix(&self.src_root)
                .expect("buffer paths are containment-checked before loading");
            let dest = self.out_root.join(rel);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|source| PatchError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            buffer
                .write_to(&dest)
                .map_err(|source| PatchError::Write {
                    path: dest.clone(),
                    source,
                })?;
            written.push(dest);
        }

        Ok(written)
    }
}
