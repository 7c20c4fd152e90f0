//! CTON decoding.
//!
//! This module parses CTON bytes back into a [`Value`] tree.
//!
//! ## Overview
//!
//! - **Single pass**: O(n) over the input, no backtracking; the only
//!   lookahead is the bounded probe that distinguishes a document from a
//!   standalone value
//! - **Key-boundary recovery**: streams written with an empty separator
//!   (`a=1b=2`) split deterministically — an unquoted scalar ends where a
//!   new key begins
//! - **Positioned errors**: every grammar violation reports a 1-indexed
//!   line and column plus the offending source line
//!
//! ## Usage
//!
//! ```rust
//! use cton::decode;
//!
//! let value = decode("friends[2]=ana,luis").unwrap();
//! let friends = value.get("friends").and_then(|v| v.as_array()).unwrap();
//! assert_eq!(friends.len(), 2);
//! ```
//!
//! Typed deserialization goes through the parsed tree: [`crate::from_str`]
//! decodes to a [`Value`] and hands it to serde via [`ValueDeserializer`].

use num_bigint::BigInt;
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::collections::HashSet;

use crate::error::{excerpt_at, ParseError, ParseResult};
use crate::grammar;
use crate::{CtonMap, DecodeOptions, Value};

/// The CTON decoder.
///
/// A cursor over a borrowed input slice. All per-call state (position,
/// the optional key intern table) lives here and is dropped when the call
/// returns; the produced tree is freshly owned.
pub struct Decoder<'de> {
    input: &'de str,
    position: usize,
    line: usize,
    column: usize,
    interner: Option<HashSet<String>>,
}

impl<'de> Decoder<'de> {
    pub fn new(input: &'de str, options: &DecodeOptions) -> Self {
        Decoder {
            input,
            position: 0,
            line: 1,
            column: 1,
            interner: options.symbolize_keys.then(HashSet::new),
        }
    }

    /// Parses the entire input: a document of top-level pairs, a single
    /// standalone value, or (for blank input) the empty document. Trailing
    /// bytes after the parsed form are an error.
    pub fn parse_root(&mut self) -> ParseResult<Value> {
        self.skip_trivia();
        let value = if self.at_end() {
            Value::Object(CtonMap::new())
        } else if self.looks_like_document() {
            self.parse_document()?
        } else {
            self.parse_value(false)?
        };
        self.skip_trivia();
        if !self.at_end() {
            return Err(self.err("trailing data after document"));
        }
        Ok(value)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn remaining_len(&self) -> usize {
        self.input.len().saturating_sub(self.position)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.input[self.position..].chars().next()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Advances over `len` bytes that are known to end on a char boundary.
    fn advance_over(&mut self, len: usize) {
        for ch in self.input[self.position..self.position + len].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += len;
    }

    /// Skips whitespace and `#`-to-end-of-line comments. Comments are
    /// allowed anywhere whitespace is and carry no meaning.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if grammar::is_whitespace_byte(b) => {
                    self.bump();
                }
                Some(b'#') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(
            self.line,
            self.column,
            message,
            excerpt_at(self.input, self.position),
        )
    }

    fn expect(&mut self, byte: u8, message: &str) -> ParseResult<()> {
        if self.peek() == Some(byte) {
            self.bump();
            Ok(())
        } else {
            Err(self.err(message))
        }
    }

    /// Canonicalizes a key through the intern table when key symbolizing
    /// is on; otherwise just allocates.
    fn key_string(&mut self, s: &str) -> String {
        match &mut self.interner {
            Some(table) => match table.get(s) {
                Some(interned) => interned.clone(),
                None => {
                    let owned = s.to_string();
                    table.insert(owned.clone());
                    owned
                }
            },
            None => s.to_string(),
        }
    }

    /// True when the input continues with `KEY` then (after whitespace)
    /// `(`, `[`, or `=` — the document form. Pure lookahead.
    fn looks_like_document(&self) -> bool {
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut i = start;
        while i < bytes.len() && grammar::is_safe_key_byte(bytes[i]) {
            i += 1;
        }
        if i == start {
            return false;
        }
        while i < bytes.len() && grammar::is_whitespace_byte(bytes[i]) {
            i += 1;
        }
        matches!(bytes.get(i), Some(b'(' | b'[' | b'='))
    }

    fn parse_document(&mut self) -> ParseResult<Value> {
        let mut map = CtonMap::new();
        loop {
            self.skip_trivia();
            if self.at_end() {
                break;
            }
            let key = self.parse_key()?;
            self.skip_trivia();
            let value = match self.peek() {
                Some(b'(') => {
                    self.bump();
                    self.parse_object()?
                }
                Some(b'[') => {
                    self.bump();
                    self.parse_array()?
                }
                Some(b'=') => {
                    self.bump();
                    self.parse_scalar(true)?
                }
                _ => return Err(self.err("expected '(', '[' or '=' after key")),
            };
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn parse_key(&mut self) -> ParseResult<String> {
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && grammar::is_safe_key_byte(bytes[end]) {
            end += 1;
        }
        if end == start {
            return Err(self.err("expected a key"));
        }
        let input = self.input;
        self.advance_over(end - start);
        Ok(self.key_string(&input[start..end]))
    }

    /// Object contents, after the opening `(`. Pairs separated by `,`,
    /// closed by `)`; scalar reads in here never use the boundary
    /// heuristic because the closer is unambiguous.
    fn parse_object(&mut self) -> ParseResult<Value> {
        let mut map = CtonMap::new();
        self.skip_trivia();
        if self.peek() == Some(b')') {
            self.bump();
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_trivia();
            let key = self.parse_key()?;
            self.skip_trivia();
            let value = match self.peek() {
                Some(b'(') => {
                    self.bump();
                    self.parse_object()?
                }
                Some(b'[') => {
                    self.bump();
                    self.parse_array()?
                }
                Some(b'=') => {
                    self.bump();
                    self.parse_scalar(false)?
                }
                _ => return Err(self.err("expected '(', '[' or '=' after key")),
            };
            map.insert(key, value);
            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b')') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some(_) => return Err(self.err("expected ',' or ')' in object")),
                None => return Err(self.err("unterminated object, expected ')'")),
            }
        }
    }

    /// Array contents, after the opening `[`: length, `]`, an optional
    /// `{header}`, `=`, then the body.
    fn parse_array(&mut self) -> ParseResult<Value> {
        self.skip_trivia();
        let len = self.parse_length()?;
        self.skip_trivia();
        self.expect(b']', "expected ']' after array length")?;
        self.skip_trivia();
        if self.peek() == Some(b'{') {
            self.bump();
            let headers = self.parse_header()?;
            self.skip_trivia();
            self.expect(b'=', "expected '=' after table header")?;
            self.parse_table_rows(len, &headers)
        } else {
            self.expect(b'=', "expected '=' after array length")?;
            self.parse_elements(len)
        }
    }

    fn parse_length(&mut self) -> ParseResult<usize> {
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end == start {
            return Err(self.err("expected array length"));
        }
        let input = self.input;
        self.advance_over(end - start);
        input[start..end]
            .parse::<usize>()
            .map_err(|_| self.err("invalid length literal"))
    }

    fn parse_header(&mut self) -> ParseResult<Vec<String>> {
        let mut headers = Vec::new();
        loop {
            self.skip_trivia();
            headers.push(self.parse_key()?);
            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b'}') => {
                    self.bump();
                    return Ok(headers);
                }
                _ => return Err(self.err("expected ',' or '}' in table header")),
            }
        }
    }

    /// Exactly `len` rows of exactly `headers.len()` scalars; `;` between
    /// rows, `,` between columns. Rows materialize as objects in header
    /// order. The last scalar of the last row may run into the next
    /// top-level pair, so it reads with the boundary heuristic.
    fn parse_table_rows(&mut self, len: usize, headers: &[String]) -> ParseResult<Value> {
        if len == 0 {
            return Ok(Value::Array(Vec::new()));
        }
        // Trust the declared length for capacity only as far as the
        // remaining input could actually hold that many rows.
        let mut rows = Vec::with_capacity(len.min(self.remaining_len() / 2 + 1));
        for r in 0..len {
            self.skip_trivia();
            if r > 0 {
                if self.peek() != Some(b';') {
                    return Err(self.err(format!(
                        "table declared {len} rows but input ended after {r}"
                    )));
                }
                self.bump();
            }
            let mut row = CtonMap::with_capacity(headers.len());
            for (c, header) in headers.iter().enumerate() {
                self.skip_trivia();
                if c > 0 {
                    if self.peek() != Some(b',') {
                        return Err(self.err(format!(
                            "table row {} has {} of {} columns",
                            r + 1,
                            c,
                            headers.len()
                        )));
                    }
                    self.bump();
                }
                let last = r + 1 == len && c + 1 == headers.len();
                let value = self.parse_scalar(last)?;
                row.insert(header.clone(), value);
            }
            rows.push(Value::Object(row));
        }
        Ok(Value::Array(rows))
    }

    /// Exactly `len` comma-separated elements. Elements may themselves be
    /// objects, arrays, quoted strings, or scalars; the final one reads
    /// with the boundary heuristic.
    fn parse_elements(&mut self, len: usize) -> ParseResult<Value> {
        if len == 0 {
            return Ok(Value::Array(Vec::new()));
        }
        let mut elements = Vec::with_capacity(len.min(self.remaining_len() / 2 + 1));
        for i in 0..len {
            self.skip_trivia();
            if i > 0 {
                if self.peek() != Some(b',') {
                    return Err(self.err(format!(
                        "array declared {len} elements but input ended after {i}"
                    )));
                }
                self.bump();
            }
            let last = i + 1 == len;
            elements.push(self.parse_value(last)?);
        }
        Ok(Value::Array(elements))
    }

    /// A value in element or standalone position.
    fn parse_value(&mut self, boundary: bool) -> ParseResult<Value> {
        self.skip_trivia();
        match self.peek() {
            Some(b'(') => {
                self.bump();
                self.parse_object()
            }
            Some(b'[') => {
                self.bump();
                self.parse_array()
            }
            _ => self.parse_scalar(boundary),
        }
    }

    fn parse_scalar(&mut self, boundary: bool) -> ParseResult<Value> {
        self.skip_trivia();
        if self.peek() == Some(b'"') {
            return Ok(Value::String(self.parse_quoted()?));
        }
        let token = self.scan_token(boundary)?;
        Ok(convert_token(token))
    }

    fn parse_quoted(&mut self) -> ParseResult<String> {
        self.bump(); // opening quote
        let mut result = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(result),
                Some('\\') => match self.bump() {
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some(other) => {
                        return Err(self.err(format!("unsupported escape '\\{other}'")))
                    }
                    None => return Err(self.err("unterminated string")),
                },
                Some(other) => result.push(other),
                None => return Err(self.err("unterminated string")),
            }
        }
    }

    /// Reads an unquoted token: the maximal run of non-terminator bytes,
    /// truncated at a detected key boundary when `boundary` is on.
    fn scan_token(&mut self, boundary: bool) -> ParseResult<&'de str> {
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && !grammar::is_terminator_byte(bytes[end]) {
            end += 1;
        }
        if boundary {
            if let Some(cut) = key_boundary_in(bytes, start, end) {
                end = cut;
            }
        }
        if end == start {
            return Err(self.err("expected a value"));
        }
        let input = self.input;
        self.advance_over(end - start);
        Ok(&input[start..end])
    }
}

/// Finds the first position inside `[start+1, end)` where a new top-level
/// key begins: a forward-maximal safe-key run whose first byte is a
/// boundary-start byte (letters, `_`, `.`, `:` — not digits or `-`) and
/// whose end is immediately followed by `(`, `[`, or `=`.
///
/// Excluding digit and `-` starts keeps numeric payloads whole: `a=1b=2`
/// splits before `b`, while `a=123` never splits at all. A key that does
/// begin with a digit simply cannot follow a numeric scalar in a
/// separator-less stream.
pub(crate) fn key_boundary_in(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    for i in start + 1..end {
        if !grammar::is_boundary_start_byte(bytes[i]) {
            continue;
        }
        let mut j = i;
        while j < bytes.len() && grammar::is_safe_key_byte(bytes[j]) {
            j += 1;
        }
        if matches!(bytes.get(j), Some(b'(' | b'[' | b'=')) {
            return Some(i);
        }
    }
    None
}

/// Converts an unquoted token: reserved literals, then the strict integer
/// and decimal classes, then a plain string.
///
/// The integer class rejects leading zeros, so `007` stays the string the
/// encoder quoted it from. Integers past `i64` widen to `BigInt`; a
/// decimal token whose value overflows `f64` stays a string rather than
/// smuggling a non-finite number into the tree.
fn convert_token(token: &str) -> Value {
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if grammar::is_integer_token(token) {
                if let Ok(n) = token.parse::<i64>() {
                    return Value::Integer(n);
                }
                if let Ok(n) = token.parse::<BigInt>() {
                    return Value::BigInt(n);
                }
            } else if grammar::is_decimal_token(token) {
                if let Ok(f) = token.parse::<f64>() {
                    if f.is_finite() {
                        return Value::Decimal(f);
                    }
                }
            }
            Value::String(token.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// serde glue: deserialize typed values out of a parsed tree.
// ---------------------------------------------------------------------------

/// Deserializer over an owned [`Value`], used by [`crate::from_str`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = ParseError;

    fn deserialize_any<V>(self, visitor: V) -> ParseResult<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::BigInt(bi) => {
                // Hand back a native integer when one can carry it.
                if let Ok(u) = u64::try_from(&bi) {
                    visitor.visit_u64(u)
                } else if let Ok(i) = i64::try_from(&bi) {
                    visitor.visit_i64(i)
                } else {
                    visitor.visit_string(bi.to_string())
                }
            }
            Value::Decimal(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
            Value::Date(dt) => visitor.visit_string(dt.to_rfc3339()),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> ParseResult<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> ParseResult<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> ParseResult<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) => {
                let mut iter = obj.into_iter();
                match (iter.next(), iter.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    _ => Err(de::Error::custom(
                        "expected an object with a single variant key",
                    )),
                }
            }
            _ => Err(de::Error::custom("expected enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = ParseError;

    fn next_element_seed<T>(&mut self, seed: T) -> ParseResult<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: CtonMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = ParseError;

    fn next_key_seed<K>(&mut self, seed: K) -> ParseResult<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> ParseResult<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(de::Error::custom(
                "next_value_seed called before next_key_seed",
            )),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer {
            variant,
            value: Some(value),
        }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = ParseError;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> ParseResult<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = ParseError;

    fn unit_variant(self) -> ParseResult<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(de::Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> ParseResult<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(de::Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> ParseResult<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(de::Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> ParseResult<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj)),
            _ => Err(de::Error::custom("expected struct variant")),
        }
    }
}
