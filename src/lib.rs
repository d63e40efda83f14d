//! Maki Patcher: applies macro translations back into C source trees
//!
//! A batch post-processing tool for the Maki macro-analysis stage. Maki
//! identifies preprocessor macros that can be rewritten as ordinary C
//! declarations; this crate takes those translations and patches them into
//! a copy of the source tree.
//!
//! # Architecture
//!
//! All replacement work compiles down to a single primitive:
//! [`SourceFileBuffer::replace_span`], a line-span overwrite on an in-memory
//! line buffer. Intelligence lives in deciding *what* to replace (the
//! [`provider`] module, which parses Maki's results), not in the application
//! logic (the [`engine`] module).
//!
//! # Guarantees
//!
//! - Each referenced source file is read from disk at most once per run
//! - Edits preserve the file's line count, so line numbers held by later
//!   edits in the same file stay valid
//! - Atomic output writes (tempfile + fsync + rename)
//! - Macros defined outside the input tree are skipped, never patched
//! - Only touched files appear in the output tree
//!
//! # Example
//!
//! ```no_run
//! use maki_patcher::{interface_equivalent_translations, load_from_path, PatchEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = load_from_path("maki_results.json")?;
//! let translations = interface_equivalent_translations(&data);
//!
//! let mut engine = PatchEngine::new("/src/project", "/src/project-translated");
//! engine.apply(&translations)?;
//! engine.flush()?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod engine;
pub mod location;
pub mod provider;

// Re-exports
pub use buffer::{BufferError, SourceFileBuffer};
pub use engine::{PatchEngine, PatchError, TranslateOutcome};
pub use location::{LocationError, SourceLocation};
pub use provider::{
    interface_equivalent_translations, load_from_path, load_from_str, AnalysisData, Macro,
    ProviderError, TranslationEntry, TranslationMap,
};
