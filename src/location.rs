use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A parsed `path:line[:col]` location reference, as emitted by Maki.
///
/// Lines and columns are 1-indexed. Patching only cares about line
/// granularity; the column is carried through for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// File the location points into, exactly as the analysis emitted it
    pub file: PathBuf,
    /// 1-indexed line number
    pub line: usize,
    /// 1-indexed column, if the reference carried one
    pub column: Option<usize>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location '{0}' is missing a line number")]
    MissingLine(String),

    #[error("location '{raw}' has a non-numeric line number '{field}'")]
    InvalidLine { raw: String, field: String },

    #[error("location '{raw}' has a non-numeric column '{field}'")]
    InvalidColumn { raw: String, field: String },

    #[error("location '{0}' has line number zero (lines are 1-indexed)")]
    ZeroLine(String),
}

impl SourceLocation {
    /// Parse a `path:line[:col]` reference.
    ///
    /// Fields after the column are ignored.
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        let mut parts = raw.split(':');
        // split always yields at least one field
        let file = parts.next().unwrap_or_default();

        let line_field = parts
            .next()
            .ok_or_else(|| LocationError::MissingLine(raw.to_string()))?;
        let line: usize = line_field
            .parse()
            .map_err(|_| LocationError::InvalidLine {
                raw: raw.to_string(),
                field: line_field.to_string(),
            })?;
        if line == 0 {
            return Err(LocationError::ZeroLine(raw.to_string()));
        }

        let column = match parts.next() {
            Some(col_field) => Some(col_field.parse().map_err(|_| {
                LocationError::InvalidColumn {
                    raw: raw.to_string(),
                    field: col_field.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            file: PathBuf::from(file),
            line,
            column,
        })
    }

    /// The 0-based index of this location's line in a line buffer.
    pub fn line_index(&self) -> usize {
        self.line - 1
    }
}

impl FromStr for SourceLocation {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceLocation::parse(s)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)?;
        if let Some(column) = self.column {
            write!(f, ":{}", column)?;
        }
        Ok(())
    }
}
