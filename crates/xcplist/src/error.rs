//! Error types for plist reading, writing and coercion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while coercing, encoding, decoding, reading or writing plists.
///
/// Native backend trouble never shows up here: it is absorbed by the dispatcher
/// and turned into a fallback to the portable XML encoder.
#[derive(Error, Debug)]
pub enum XcplistError {
    /// A value, key, root or path could not be coerced into the restricted plist
    /// model, or a parsed document contains a disallowed value type.
    #[error("Type error: {0}")]
    Type(String),

    /// The path handed to `read_plist` does not exist.
    #[error("No such file: {}", .0.display())]
    NotFound(PathBuf),

    /// The input bytes are not a well-formed plist in either dialect.
    /// Includes the 1-based line number where the error was detected.
    #[error("Plist parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Same as `Parse`, attributed to the file that was being read.
    #[error("Unparsable plist {} (line {line}): {message}", path.display())]
    Unparsable {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Underlying filesystem failure (permissions, disk full, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`XcplistError`], for callers that need to tell
/// a missing input apart from a malformed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    NotFound,
    Parse,
    Io,
}

impl XcplistError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        XcplistError::Type(message.into())
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        XcplistError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Which error class this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            XcplistError::Type(_) => ErrorKind::Type,
            XcplistError::NotFound(_) => ErrorKind::NotFound,
            XcplistError::Parse { .. } | XcplistError::Unparsable { .. } => ErrorKind::Parse,
            XcplistError::Io(_) => ErrorKind::Io,
        }
    }

    /// Attach the offending file to a parse error. Other variants pass through.
    pub(crate) fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            XcplistError::Parse { line, message } => XcplistError::Unparsable {
                path: path.into(),
                line,
                message,
            },
            other => other,
        }
    }
}

/// Convenience alias used throughout xcplist.
pub type Result<T> = std::result::Result<T, XcplistError>;
