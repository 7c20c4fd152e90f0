//! Error types for CTON encoding, decoding, and validation.
//!
//! The codec surfaces two kinds of failures:
//!
//! - [`EncodeError`]: the input tree or configuration is unusable (invalid
//!   key, unsupported projection, bad option value, sink I/O failure). No
//!   partial output is promised once an encode call fails.
//! - [`ParseError`]: the byte stream violates the grammar. Every syntax
//!   error carries a 1-indexed line and column plus a short excerpt of the
//!   offending source line.
//!
//! The validate-only path collects [`ValidationError`]s instead of stopping
//! at the first problem; see [`crate::validate`].
//!
//! ## Examples
//!
//! ```rust
//! use cton::decode;
//!
//! let err = decode("note=\"unclosed").unwrap_err();
//! assert!(err.to_string().contains("line 1"));
//! ```

use std::fmt;
use thiserror::Error;

/// An error produced while encoding a value tree.
///
/// Encode errors are always the caller's input or configuration, never the
/// codec's state: the encoder holds nothing between calls.
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// A key contains characters outside `[0-9A-Za-z_.:-]` or is empty.
    #[error("invalid key {0:?}: keys must be non-empty and match [0-9A-Za-z_.:-]+")]
    InvalidKey(String),

    /// A value cannot be projected into the closed CTON variant set.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A configuration option was given an unknown value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The byte sink failed.
    #[error("io error: {0}")]
    Io(String),

    /// Generic message (serde projection errors land here).
    #[error("{0}")]
    Message(String),
}

impl EncodeError {
    /// Creates an invalid-key error.
    pub fn invalid_key(key: &str) -> Self {
        EncodeError::InvalidKey(key.to_string())
    }

    /// Creates an unsupported-type error for values outside the closed set.
    pub fn unsupported_type(msg: &str) -> Self {
        EncodeError::UnsupportedType(msg.to_string())
    }

    /// Creates an invalid-configuration error.
    pub fn invalid_config(msg: &str) -> Self {
        EncodeError::InvalidConfig(msg.to_string())
    }

    /// Creates an I/O error from a failed sink write.
    pub fn io(err: &std::io::Error) -> Self {
        EncodeError::Io(err.to_string())
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        EncodeError::Message(msg.to_string())
    }
}

/// An error produced while decoding a CTON byte stream.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A grammar violation at a known position.
    #[error("parse error at line {line}, column {column}: {message}\n  {excerpt}")]
    Syntax {
        /// 1-indexed line of the offending byte.
        line: usize,
        /// 1-indexed column of the offending byte.
        column: usize,
        /// What went wrong.
        message: String,
        /// The source line around the error position.
        excerpt: String,
    },

    /// Generic message (typed deserialization errors land here).
    #[error("{0}")]
    Custom(String),
}

impl ParseError {
    /// Creates a syntax error with position and source excerpt.
    pub fn syntax(line: usize, column: usize, message: impl Into<String>, excerpt: String) -> Self {
        ParseError::Syntax {
            line,
            column,
            message: message.into(),
            excerpt,
        }
    }

    /// The 1-indexed line of the error, if positioned.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Custom(_) => None,
        }
    }

    /// The 1-indexed column of the error, if positioned.
    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { column, .. } => Some(*column),
            ParseError::Custom(_) => None,
        }
    }
}

impl serde::de::Error for ParseError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ParseError::Custom(msg.to_string())
    }
}

/// A single finding from the validate-only path.
///
/// Carries the same positional information as a [`ParseError`], collected
/// into a list so one pass can report several problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}\n  {excerpt}")]
pub struct ValidationError {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub excerpt: String,
}

/// Result alias for encode-side operations.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Result alias for decode-side operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Extracts the source line containing `offset`, trimmed to a readable
/// width, for error excerpts.
pub(crate) fn excerpt_at(input: &str, offset: usize) -> String {
    let offset = offset.min(input.len());
    let start = input[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = input[offset..]
        .find('\n')
        .map_or(input.len(), |i| offset + i);
    let line = &input[start..end];

    const MAX: usize = 60;
    if line.chars().count() <= MAX {
        line.to_string()
    } else {
        // Center the window on the error column.
        let col = input[start..offset].chars().count();
        let from = col.saturating_sub(MAX / 2);
        let window: String = line.chars().skip(from).take(MAX).collect();
        if from > 0 {
            format!("…{window}…")
        } else {
            format!("{window}…")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_returns_the_error_line() {
        let input = "first=1\nsecond=oops\nthird=3";
        assert_eq!(excerpt_at(input, 10), "second=oops");
    }

    #[test]
    fn excerpt_windows_long_lines() {
        let long = "k=".to_string() + &"x".repeat(200);
        let excerpt = excerpt_at(&long, 150);
        assert!(excerpt.contains('…'));
        assert!(excerpt.chars().count() < 70);
    }

    #[test]
    fn parse_error_exposes_position() {
        let err = ParseError::syntax(3, 7, "unexpected byte", "ctx".into());
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(7));
        assert!(err.to_string().contains("line 3, column 7"));
    }
}
