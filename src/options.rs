//! Configuration for CTON encoding and decoding.
//!
//! - [`EncodeOptions`]: separator between top-level pairs, pretty
//!   indentation, decimal formatting mode, and per-key comments
//! - [`DecimalMode`]: fast (shortest round-trip) or precise (exact binary
//!   expansion) float formatting
//! - [`DecodeOptions`]: key interning on decode
//!
//! ## Examples
//!
//! ```rust
//! use cton::{cton, encode, EncodeOptions, DecimalMode};
//!
//! let value = cton!({"a": 1, "b": 2});
//!
//! // Pack pairs onto one line, relying on the decoder's boundary heuristic
//! let options = EncodeOptions::new().with_separator("");
//! assert_eq!(encode(&value, &options).unwrap(), "a=1b=2");
//!
//! // Exact binary expansions instead of shortest round-trip floats
//! let options = EncodeOptions::new().with_decimal_mode(DecimalMode::Precise);
//! let out = encode(&cton!({"x": 0.1}), &options).unwrap();
//! assert!(out.starts_with("x=0.100000000000000005"));
//! ```

use indexmap::IndexMap;
use std::str::FromStr;

use crate::error::EncodeError;

/// How the encoder renders `Decimal` values.
///
/// Both modes produce plain positional notation; they differ in how many
/// digits a float contributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecimalMode {
    /// The host's shortest string that round-trips the float. Default.
    #[default]
    Fast,
    /// The full fixed-point expansion of the float's exact binary value.
    Precise,
}

impl DecimalMode {
    /// Returns the mode's configuration name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DecimalMode::Fast => "fast",
            DecimalMode::Precise => "precise",
        }
    }
}

impl FromStr for DecimalMode {
    type Err = EncodeError;

    /// Parses a configuration name; unknown names fail here, at
    /// construction, rather than on first use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(DecimalMode::Fast),
            "precise" => Ok(DecimalMode::Precise),
            other => Err(EncodeError::invalid_config(&format!(
                "unknown decimal mode {other:?} (expected \"fast\" or \"precise\")"
            ))),
        }
    }
}

/// Configuration options for CTON encoding.
///
/// # Examples
///
/// ```rust
/// use cton::{EncodeOptions, DecimalMode};
///
/// let options = EncodeOptions::new()
///     .with_separator("\n")
///     .with_decimal_mode(DecimalMode::Precise)
///     .with_comment("hikes", "sorted by date");
/// ```
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Byte string inserted between top-level pairs. Default `"\n"`. The
    /// empty string is legal and defers pair recovery to the decoder's
    /// key-boundary heuristic.
    pub separator: String,
    /// Emit object bodies one pair per indented line.
    pub pretty: bool,
    /// Spaces per nesting level in pretty mode.
    pub indent: usize,
    /// Float formatting mode.
    pub decimal_mode: DecimalMode,
    /// Comment text attached to top-level keys, emitted as `#`-prefixed
    /// lines before the corresponding pair. Purely cosmetic: the decoder
    /// discards comments.
    pub comments: IndexMap<String, String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            separator: "\n".to_string(),
            pretty: false,
            indent: 2,
            decimal_mode: DecimalMode::default(),
            comments: IndexMap::new(),
        }
    }
}

impl EncodeOptions {
    /// Creates default options (newline separator, compact output, fast
    /// decimals).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output.
    #[must_use]
    pub fn pretty() -> Self {
        EncodeOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the separator emitted between top-level pairs.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the indentation width used in pretty mode.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the float formatting mode.
    #[must_use]
    pub fn with_decimal_mode(mut self, mode: DecimalMode) -> Self {
        self.decimal_mode = mode;
        self
    }

    /// Attaches a comment to a top-level key. Multi-line text becomes one
    /// `#` line per line.
    #[must_use]
    pub fn with_comment(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.comments.insert(key.into(), text.into());
        self
    }
}

/// Configuration options for CTON decoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    /// Canonicalize object keys through a per-call intern table, so
    /// repeated keys (table rows, recurring field names) share one
    /// canonical spelling. Keys remain plain `String`s either way.
    pub symbolize_keys: bool,
}

impl DecodeOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables key interning.
    #[must_use]
    pub fn with_symbolized_keys(mut self) -> Self {
        self.symbolize_keys = true;
        self
    }
}
