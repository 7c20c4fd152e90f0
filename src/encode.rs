//! CTON encoding.
//!
//! This module turns a [`Value`] tree into canonical CTON bytes.
//!
//! ## Overview
//!
//! The encoder applies the format's space-saving rules as it walks the
//! tree:
//!
//! - **Table form**: arrays of uniform scalar-valued records serialize as
//!   `[N]{k1,k2}=v1,v2;…` with the keys written once
//! - **Quote minimization**: strings are written bare whenever they cannot
//!   be mistaken for a literal, a number, or structure
//! - **Numeric canonicalization**: one spelling per number, no exponents,
//!   no negative zero; non-finite floats become `null`
//!
//! Output goes to any [`io::Write`] sink; [`crate::encode`] collects into
//! an in-memory buffer and returns it as a `String`.
//!
//! ## Usage
//!
//! Most users want the free functions in the crate root:
//!
//! ```rust
//! use cton::{cton, encode, EncodeOptions};
//!
//! let value = cton!({
//!     "name": "Ada",
//!     "scores": [3, 5, 8]
//! });
//! let out = encode(&value, &EncodeOptions::default()).unwrap();
//! assert_eq!(out, "name=Ada\nscores[3]=3,5,8");
//! ```
//!
//! The serde projection seam lives here too: [`ValueSerializer`] turns any
//! `T: Serialize` into a [`Value`] before the encoder sees it, which is how
//! foreign types enter the closed variant set.

use serde::{ser, Serialize};
use std::io;

use crate::error::{EncodeError, EncodeResult};
use crate::grammar;
use crate::{CtonMap, EncodeOptions, Value};

/// The CTON encoder.
///
/// Borrows the input tree read-only and writes bytes to the sink as it
/// goes; if the sink blocks, the encoder blocks with it. Holds no state
/// between calls.
pub struct Encoder<'a, W: io::Write> {
    out: W,
    options: &'a EncodeOptions,
    depth: usize,
}

impl<'a, W: io::Write> Encoder<'a, W> {
    pub fn new(out: W, options: &'a EncodeOptions) -> Self {
        Encoder {
            out,
            options,
            depth: 0,
        }
    }

    /// Encodes `value` as a complete CTON document: objects become a
    /// sequence of separated top-level pairs, anything else a single
    /// standalone value.
    pub fn encode_document(&mut self, value: &Value) -> EncodeResult<()> {
        let options = self.options;
        match value {
            Value::Object(map) => {
                for (i, (key, child)) in map.iter().enumerate() {
                    if i > 0 {
                        self.put(&options.separator)?;
                    }
                    if let Some(comment) = options.comments.get(key) {
                        for line in comment.lines() {
                            self.put("# ")?;
                            self.put(line)?;
                            self.put("\n")?;
                        }
                    }
                    self.write_pair(key, child)?;
                }
                Ok(())
            }
            other => self.write_value(other),
        }
    }

    fn put(&mut self, s: &str) -> EncodeResult<()> {
        self.out
            .write_all(s.as_bytes())
            .map_err(|e| EncodeError::io(&e))
    }

    fn write_pair(&mut self, key: &str, value: &Value) -> EncodeResult<()> {
        if !grammar::is_safe_key(key) {
            return Err(EncodeError::invalid_key(key));
        }
        self.put(key)?;
        match value {
            Value::Object(map) => self.write_object(map),
            Value::Array(arr) => self.write_array(arr),
            scalar => {
                self.put("=")?;
                self.write_scalar(scalar)
            }
        }
    }

    fn write_object(&mut self, map: &CtonMap) -> EncodeResult<()> {
        self.put("(")?;
        if map.is_empty() {
            return self.put(")");
        }
        let pretty = self.options.pretty;
        self.depth += 1;
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.put(",")?;
            }
            if pretty {
                self.newline_indent()?;
            }
            self.write_pair(key, value)?;
        }
        self.depth -= 1;
        if pretty {
            self.newline_indent()?;
        }
        self.put(")")
    }

    fn write_array(&mut self, arr: &[Value]) -> EncodeResult<()> {
        self.put("[")?;
        self.put(&arr.len().to_string())?;
        self.put("]")?;
        if arr.is_empty() {
            return self.put("=");
        }

        if let Some((headers, rows)) = table_plan(arr) {
            self.put("{")?;
            for (i, header) in headers.iter().enumerate() {
                if i > 0 {
                    self.put(",")?;
                }
                if !grammar::is_safe_key(header) {
                    return Err(EncodeError::invalid_key(header));
                }
                self.put(header)?;
            }
            self.put("}=")?;
            for (r, row) in rows.iter().enumerate() {
                if r > 0 {
                    self.put(";")?;
                }
                for (c, cell) in row.values().enumerate() {
                    if c > 0 {
                        self.put(",")?;
                    }
                    self.write_scalar(cell)?;
                }
            }
            return Ok(());
        }

        self.put("=")?;

        // Fast path: a uniform run of unquoted scalars writes straight
        // through without per-element dispatch.
        if let Some(tokens) = unquoted_string_run(arr) {
            return self.put(&tokens.join(","));
        }
        if arr.iter().all(|v| matches!(v, Value::Integer(_))) {
            let joined = arr
                .iter()
                .filter_map(Value::as_i64)
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(",");
            return self.put(&joined);
        }

        for (i, element) in arr.iter().enumerate() {
            if i > 0 {
                self.put(",")?;
            }
            self.write_value(element)?;
        }
        Ok(())
    }

    /// Writes a value in element or standalone position: objects carry
    /// their own `(…)`, arrays their `[N]…` form, scalars stand bare.
    fn write_value(&mut self, value: &Value) -> EncodeResult<()> {
        match value {
            Value::Object(map) => self.write_object(map),
            Value::Array(arr) => self.write_array(arr),
            scalar => self.write_scalar(scalar),
        }
    }

    fn write_scalar(&mut self, value: &Value) -> EncodeResult<()> {
        match value {
            Value::Null => self.put("null"),
            Value::Bool(b) => self.put(if *b { "true" } else { "false" }),
            Value::Integer(n) => self.put(&n.to_string()),
            Value::BigInt(n) => self.put(&n.to_string()),
            Value::Decimal(d) => {
                let formatted = grammar::format_decimal(*d, self.options.decimal_mode);
                self.put(&formatted)
            }
            // RFC 3339 output never contains a quote or backslash, so the
            // quoted form needs no escaping pass.
            Value::Date(dt) => {
                self.put("\"")?;
                self.put(&dt.to_rfc3339())?;
                self.put("\"")
            }
            Value::String(s) => self.write_string(s),
            Value::Array(_) | Value::Object(_) => Err(EncodeError::unsupported_type(
                "containers cannot appear in scalar position",
            )),
        }
    }

    fn write_string(&mut self, s: &str) -> EncodeResult<()> {
        if grammar::is_safe_token(s) {
            return self.put(s);
        }
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('"');
        for ch in s.chars() {
            match ch {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\r' => quoted.push_str("\\r"),
                '\t' => quoted.push_str("\\t"),
                other => quoted.push(other),
            }
        }
        quoted.push('"');
        self.put(&quoted)
    }

    fn newline_indent(&mut self) -> EncodeResult<()> {
        self.put("\n")?;
        let pad = " ".repeat(self.depth * self.options.indent);
        self.put(&pad)
    }
}

/// Single-pass table detection.
///
/// Succeeds iff the array is non-empty, its first element is a non-empty
/// object with all-scalar values, and every later element is an object with
/// the identical key sequence and all-scalar values. Returns the header in
/// first-element key order plus the row objects.
fn table_plan(arr: &[Value]) -> Option<(Vec<&str>, Vec<&CtonMap>)> {
    let first = match arr.first()? {
        Value::Object(obj) if !obj.is_empty() => obj,
        _ => return None,
    };
    if !first.values().all(Value::is_scalar) {
        return None;
    }
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut rows = Vec::with_capacity(arr.len());
    rows.push(first);
    for element in &arr[1..] {
        let obj = match element {
            Value::Object(obj) => obj,
            _ => return None,
        };
        if !obj.keys().map(String::as_str).eq(headers.iter().copied())
            || !obj.values().all(Value::is_scalar)
        {
            return None;
        }
        rows.push(obj);
    }
    Some((headers, rows))
}

/// Returns the borrowed tokens when every element is a string that needs
/// no quoting.
fn unquoted_string_run(arr: &[Value]) -> Option<Vec<&str>> {
    arr.iter()
        .map(|v| match v {
            Value::String(s) if grammar::is_safe_token(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

/// Serializer projecting any `T: Serialize` into a [`Value`].
///
/// This is the seam that lets foreign types enter the codec: external code
/// projects into the closed variant set, then the encoder only ever sees
/// [`Value`]s.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: CtonMap,
    current_key: Option<String>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> EncodeResult<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> EncodeResult<Value> {
        Ok(Value::Integer(v as i64))
    }

    fn serialize_i16(self, v: i16) -> EncodeResult<Value> {
        Ok(Value::Integer(v as i64))
    }

    fn serialize_i32(self, v: i32) -> EncodeResult<Value> {
        Ok(Value::Integer(v as i64))
    }

    fn serialize_i64(self, v: i64) -> EncodeResult<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> EncodeResult<Value> {
        Ok(Value::Integer(v as i64))
    }

    fn serialize_u16(self, v: u16) -> EncodeResult<Value> {
        Ok(Value::Integer(v as i64))
    }

    fn serialize_u32(self, v: u32) -> EncodeResult<Value> {
        Ok(Value::Integer(v as i64))
    }

    fn serialize_u64(self, v: u64) -> EncodeResult<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> EncodeResult<Value> {
        Ok(Value::Decimal(v as f64))
    }

    fn serialize_f64(self, v: f64) -> EncodeResult<Value> {
        Ok(Value::Decimal(v))
    }

    fn serialize_char(self, v: char) -> EncodeResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> EncodeResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> EncodeResult<Value> {
        let vec = v.iter().map(|&b| Value::Integer(b as i64)).collect();
        Ok(Value::Array(vec))
    }

    fn serialize_none(self) -> EncodeResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> EncodeResult<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> EncodeResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> EncodeResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> EncodeResult<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> EncodeResult<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> EncodeResult<Value>
    where
        T: ?Sized + Serialize,
    {
        Err(EncodeError::unsupported_type("newtype variants"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> EncodeResult<SerializeVec> {
        Ok(SerializeVec::new())
    }

    fn serialize_tuple(self, _len: usize) -> EncodeResult<SerializeVec> {
        Ok(SerializeVec::new())
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> EncodeResult<SerializeVec> {
        Ok(SerializeVec::new())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> EncodeResult<SerializeVec> {
        Err(EncodeError::unsupported_type("tuple variants"))
    }

    fn serialize_map(self, _len: Option<usize>) -> EncodeResult<SerializeMap> {
        Ok(SerializeMap::new())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> EncodeResult<SerializeMap> {
        Ok(SerializeMap::new())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> EncodeResult<SerializeMap> {
        Err(EncodeError::unsupported_type("struct variants"))
    }
}

impl SerializeVec {
    fn new() -> Self {
        SerializeVec { vec: Vec::new() }
    }
}

impl SerializeMap {
    fn new() -> Self {
        SerializeMap {
            map: CtonMap::new(),
            current_key: None,
        }
    }
}

fn to_value_inner<T: Serialize + ?Sized>(value: &T) -> EncodeResult<Value> {
    value.serialize(ValueSerializer)
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T>(&mut self, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T>(&mut self, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T>(&mut self, key: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value_inner(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(EncodeError::Message("map keys must be strings".into())),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| EncodeError::Message("serialize_value called without serialize_key".into()))?;
        self.map.insert(key, to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> EncodeResult<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value_inner(value)?);
        Ok(())
    }

    fn end(self) -> EncodeResult<Value> {
        Ok(Value::Object(self.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cton;

    fn detect(value: &Value) -> Option<Vec<String>> {
        match value {
            Value::Array(arr) => {
                table_plan(arr).map(|(h, _)| h.iter().map(|s| s.to_string()).collect())
            }
            _ => None,
        }
    }

    #[test]
    fn table_detection_accepts_uniform_records() {
        let arr = cton!([
            {"id": 1, "name": "a"},
            {"id": 2, "name": "b"}
        ]);
        assert_eq!(detect(&arr), Some(vec!["id".to_string(), "name".to_string()]));
    }

    #[test]
    fn table_detection_rejects_key_order_drift() {
        let arr = cton!([
            {"id": 1, "name": "a"},
            {"name": "b", "id": 2}
        ]);
        assert_eq!(detect(&arr), None);
    }

    #[test]
    fn table_detection_rejects_nested_values_and_empty_records() {
        let nested = cton!([{"id": 1, "tags": [1, 2]}]);
        assert_eq!(detect(&nested), None);

        let empty_record = cton!([{}]);
        assert_eq!(detect(&empty_record), None);

        let mixed = cton!([{"id": 1}, 2]);
        assert_eq!(detect(&mixed), None);
    }

    #[test]
    fn invalid_keys_fail_the_encode() {
        let value = cton!({"bad key": 1});
        let err = crate::encode(&value, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidKey(_)));
    }

    #[test]
    fn fast_path_matches_general_emission() {
        let strings = cton!(["ana", "luis", "sam"]);
        let ints = cton!([1, 2, 3]);
        assert_eq!(strings.to_string(), "[3]=ana,luis,sam");
        assert_eq!(ints.to_string(), "[3]=1,2,3");
    }
}
