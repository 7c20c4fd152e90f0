//! # cton
//!
//! A codec for CTON (Compact Token-Oriented Notation), a JSON-isomorphic
//! textual format optimized for token-efficient transport of structured
//! data.
//!
//! ## What is CTON?
//!
//! CTON carries the same trees JSON does — objects, arrays, and scalars —
//! in a denser spelling aimed at LLM contexts, where every byte of
//! structure is a token billed twice:
//!
//! - **No redundant quotes**: strings are bare whenever they cannot be
//!   mistaken for a literal, a number, or structure
//! - **Tables**: an array of uniform records writes its keys once —
//!   `[3]{id,name}=1,ana;2,luis;3,sam`
//! - **One spelling per value**: numbers are canonicalized (no exponents,
//!   no `-0`, no trailing zeros), so equal trees encode to equal bytes
//!
//! ## Quick start
//!
//! ```rust
//! use cton::{decode, encode, cton, EncodeOptions, Value};
//!
//! let value = cton!({
//!     "name": "Ada",
//!     "languages": ["rust", "lisp"],
//!     "active": true
//! });
//!
//! let text = encode(&value, &EncodeOptions::default()).unwrap();
//! assert_eq!(text, "name=Ada\nlanguages[2]=rust,lisp\nactive=true");
//!
//! let back = decode(&text).unwrap();
//! assert_eq!(back, value);
//! ```
//!
//! ## Typed values via serde
//!
//! Any `T: Serialize` projects into the closed [`Value`] set before
//! encoding, and decoded trees deserialize back into typed data:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use cton::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 7, name: "Ada".into(), active: true };
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "id=7\nname=Ada\nactive=true");
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(back, user);
//! ```
//!
//! ## Tables
//!
//! Arrays of records with identical keys and scalar values compress into
//! the table form automatically:
//!
//! ```rust
//! use serde::Serialize;
//! use cton::to_string;
//!
//! #[derive(Serialize)]
//! struct Product {
//!     sku: String,
//!     price: f64,
//! }
//!
//! let products = vec![
//!     Product { sku: "A1".into(), price: 9.5 },
//!     Product { sku: "B2".into(), price: 14.25 },
//! ];
//! assert_eq!(
//!     to_string(&products).unwrap(),
//!     "[2]{sku,price}=A1,9.5;B2,14.25"
//! );
//! ```
//!
//! ## Separator-less streams
//!
//! The separator between top-level pairs is configurable down to the empty
//! string; the decoder recovers pair boundaries by spotting where a new
//! key begins:
//!
//! ```rust
//! use cton::decode;
//!
//! let value = decode("a=1b=2c=3").unwrap();
//! assert_eq!(value.get("b").and_then(|v| v.as_i64()), Some(2));
//! ```
//!
//! ## Guarantees
//!
//! - Single-pass encode and decode, no backtracking
//! - No `unsafe`, no panics in the public API
//! - Parse errors carry line, column, and a source excerpt
//! - Strictly synchronous; instances share nothing and may run in
//!   parallel on disjoint inputs
//!
//! See [`format`] for the wire grammar.

pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
mod grammar;
pub mod macros;
pub mod map;
pub mod options;
pub mod validate;
pub mod value;

pub use decode::{Decoder, ValueDeserializer};
pub use encode::{Encoder, ValueSerializer};
pub use error::{EncodeError, EncodeResult, ParseError, ParseResult, ValidationError};
pub use map::CtonMap;
pub use options::{DecimalMode, DecodeOptions, EncodeOptions};
pub use validate::validate;
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Encodes a value tree to canonical CTON text.
///
/// An object at the root becomes a document of separated top-level pairs;
/// any other root becomes a single standalone value.
///
/// # Examples
///
/// ```rust
/// use cton::{cton, encode, EncodeOptions};
///
/// let value = cton!({"greeting": "hello there"});
/// let text = encode(&value, &EncodeOptions::default()).unwrap();
/// assert_eq!(text, "greeting=\"hello there\"");
/// ```
///
/// # Errors
///
/// Returns an error for keys outside `[0-9A-Za-z_.:-]+`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value, options: &EncodeOptions) -> EncodeResult<String> {
    let mut buf = Vec::with_capacity(256);
    Encoder::new(&mut buf, options).encode_document(value)?;
    // The encoder writes nothing but UTF-8.
    String::from_utf8(buf).map_err(|e| EncodeError::Message(e.to_string()))
}

/// Encodes a value tree into an externally supplied byte sink.
///
/// The encoder writes as it walks the tree; if the sink blocks, the call
/// blocks with it.
///
/// # Errors
///
/// Returns an error if encoding fails or the sink reports an I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_to<W>(value: &Value, writer: W, options: &EncodeOptions) -> EncodeResult<()>
where
    W: io::Write,
{
    Encoder::new(writer, options).encode_document(value)
}

/// Decodes CTON text into a value tree.
///
/// # Examples
///
/// ```rust
/// use cton::decode;
///
/// let value = decode("friends[2]=ana,luis").unwrap();
/// assert!(value.get("friends").is_some());
/// ```
///
/// # Errors
///
/// Returns a [`ParseError`] with line, column, and excerpt for any grammar
/// violation, length mismatch, or trailing data.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(input: &str) -> ParseResult<Value> {
    decode_with_options(input, &DecodeOptions::default())
}

/// Decodes CTON text with explicit options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options(input: &str, options: &DecodeOptions) -> ParseResult<Value> {
    Decoder::new(input, options).parse_root()
}

/// Decodes CTON bytes, checking they are valid UTF-8 first.
///
/// # Errors
///
/// Returns an error for invalid UTF-8 or any grammar violation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_slice(bytes: &[u8]) -> ParseResult<Value> {
    let input = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::Custom(format!("input is not valid UTF-8: {e}")))?;
    decode(input)
}

/// Projects any `T: Serialize` into a [`Value`].
///
/// This is the extension seam: foreign types enter the codec by projecting
/// into the closed variant set, then the encoder only ever sees `Value`s.
///
/// # Errors
///
/// Returns an error for shapes the closed set cannot carry (for example,
/// enum variants with content).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> EncodeResult<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Serializes any `T: Serialize` to CTON text with default options.
///
/// # Errors
///
/// Returns an error if the projection or the encode fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> EncodeResult<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serializes any `T: Serialize` to CTON text with custom options.
///
/// # Errors
///
/// Returns an error if the projection or the encode fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> EncodeResult<String>
where
    T: ?Sized + Serialize,
{
    encode(&to_value(value)?, options)
}

/// Deserializes a `T: Deserialize` from CTON text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use cton::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x=1\ny=2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid CTON or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> ParseResult<T>
where
    T: DeserializeOwned,
{
    let value = decode(s)?;
    T::deserialize(ValueDeserializer::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn typed_roundtrip() {
        let point = Point { x: 1, y: -2 };
        let text = to_string(&point).unwrap();
        assert_eq!(text, "x=1\ny=-2");
        let back: Point = from_str(&text).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn encode_to_writes_the_same_bytes() {
        let value = cton!({"a": 1, "b": "two"});
        let direct = encode(&value, &EncodeOptions::default()).unwrap();

        let mut sink = Vec::new();
        encode_to(&value, &mut sink, &EncodeOptions::default()).unwrap();
        assert_eq!(sink, direct.as_bytes());
    }

    #[test]
    fn decode_slice_rejects_invalid_utf8() {
        let err = decode_slice(&[b'a', b'=', 0xff]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn empty_input_is_the_empty_document() {
        assert_eq!(decode("").unwrap(), Value::Object(CtonMap::new()));
        assert_eq!(decode("  \n\t").unwrap(), Value::Object(CtonMap::new()));
    }
}
