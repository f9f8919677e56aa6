use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a whole read or write.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file {path:?} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A problem with a single line. The parser recovers from all of these by skipping the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid section header")]
    MalformedHeader,

    #[error("invalid entry: {0}")]
    MalformedEntry(#[from] MalformedEntry),

    #[error("section {name:?} already exists")]
    DuplicateSection { name: String },

    #[error("entry {name:?} already exists")]
    DuplicateEntry { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedEntry {
    #[error("entry name is empty")]
    EmptyName,

    #[error("value is empty")]
    EmptyValue,

    #[error("unterminated string, expected closing {quote:?}")]
    UnterminatedQuote { quote: char },
}

/// A recovered [`ParseError`] together with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    #[source]
    pub error: ParseError,
}

/// Returned by the strict accessors of [`crate::ParameterStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("section {section:?} not found")]
    MissingSection { section: String },

    #[error("entry {name:?} not found in section {section:?}")]
    MissingEntry { section: String, name: String },

    #[error("entry {name:?} in section {section:?} has no values")]
    NoValue { section: String, name: String },

    #[error("value {value:?} of {section}.{name} is not a valid {expected}")]
    Invalid {
        section: String,
        name: String,
        value: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn line_error_names_the_line_and_keeps_the_cause() {
        let error = LineError {
            line: 7,
            error: ParseError::MalformedEntry(MalformedEntry::EmptyName),
        };

        assert_eq!(error.to_string(), "line 7: invalid entry: entry name is empty");
        assert_eq!(
            error.source().map(ToString::to_string),
            Some("invalid entry: entry name is empty".to_owned())
        );
    }
}
