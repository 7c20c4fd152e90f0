//! Grammar validation without materializing values.
//!
//! [`validate`] runs a skim pass over the same grammar the decoder parses,
//! but builds nothing: tokens are scanned and dropped. Where the decoder
//! stops at the first violation, the validator records it, resynchronizes
//! at the next structural boundary (newline, `,`, `;`, `)`, `]`, `}`), and
//! keeps going, so one pass can report several problems.
//!
//! An empty result means the input parses.
//!
//! ```rust
//! use cton::validate;
//!
//! assert!(validate("a=1\nb=(c=2)").is_empty());
//!
//! let errors = validate("a=\"unclosed\nb=]");
//! assert!(!errors.is_empty());
//! ```

use crate::error::{excerpt_at, ValidationError};
use crate::grammar;

/// Hard cap on reported findings; past this the input is noise.
const MAX_ERRORS: usize = 20;

/// Checks `input` against the CTON grammar and returns every violation
/// found, in source order.
pub fn validate(input: &str) -> Vec<ValidationError> {
    let mut checker = Checker::new(input);
    checker.run();
    checker.errors
}

/// Signals "record made, resynchronize".
struct Stop;

type Check = Result<(), Stop>;

struct Checker<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    errors: Vec<ValidationError>,
}

impl<'a> Checker<'a> {
    fn new(input: &'a str) -> Self {
        Checker {
            input,
            position: 0,
            line: 1,
            column: 1,
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        self.skip_trivia();
        if self.at_end() {
            return;
        }
        if !self.looks_like_document() {
            match self.check_value(false) {
                Ok(()) => {
                    self.skip_trivia();
                    if self.at_end() {
                        return;
                    }
                    self.record("trailing data after document");
                    if !self.resync() {
                        return;
                    }
                }
                Err(Stop) => {
                    if !self.resync() {
                        return;
                    }
                }
            }
        }
        // Document mode doubles as the recovery mode: after any resync the
        // most likely next thing is a fresh top-level pair.
        loop {
            if self.errors.len() >= MAX_ERRORS {
                return;
            }
            self.skip_trivia();
            if self.at_end() {
                return;
            }
            if self.check_pair().is_err() && !self.resync() {
                return;
            }
        }
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
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

    fn record(&mut self, message: impl Into<String>) {
        self.errors.push(ValidationError {
            line: self.line,
            column: self.column,
            message: message.into(),
            excerpt: excerpt_at(self.input, self.position),
        });
    }

    fn fail(&mut self, message: impl Into<String>) -> Check {
        self.record(message);
        Err(Stop)
    }

    /// Skips past the next structural boundary byte. Returns false when
    /// the input is exhausted instead.
    fn resync(&mut self) -> bool {
        while let Some(b) = self.peek() {
            self.bump();
            if matches!(b, b'\n' | b',' | b';' | b')' | b']' | b'}') {
                return true;
            }
        }
        false
    }

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

    fn check_pair(&mut self) -> Check {
        self.check_key()?;
        self.skip_trivia();
        match self.peek() {
            Some(b'(') => {
                self.bump();
                self.check_object()
            }
            Some(b'[') => {
                self.bump();
                self.check_array()
            }
            Some(b'=') => {
                self.bump();
                self.check_scalar(true)
            }
            _ => self.fail("expected '(', '[' or '=' after key"),
        }
    }

    fn check_key(&mut self) -> Check {
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && grammar::is_safe_key_byte(bytes[end]) {
            end += 1;
        }
        if end == start {
            return self.fail("expected a key");
        }
        self.advance_over(end - start);
        Ok(())
    }

    fn check_object(&mut self) -> Check {
        self.skip_trivia();
        if self.peek() == Some(b')') {
            self.bump();
            return Ok(());
        }
        loop {
            self.skip_trivia();
            self.check_key()?;
            self.skip_trivia();
            match self.peek() {
                Some(b'(') => {
                    self.bump();
                    self.check_object()?;
                }
                Some(b'[') => {
                    self.bump();
                    self.check_array()?;
                }
                Some(b'=') => {
                    self.bump();
                    self.check_scalar(false)?;
                }
                _ => return self.fail("expected '(', '[' or '=' after key"),
            }
            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b')') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => return self.fail("expected ',' or ')' in object"),
                None => return self.fail("unterminated object, expected ')'"),
            }
        }
    }

    fn check_array(&mut self) -> Check {
        self.skip_trivia();
        let len = self.check_length()?;
        self.skip_trivia();
        if self.peek() != Some(b']') {
            return self.fail("expected ']' after array length");
        }
        self.bump();
        self.skip_trivia();
        if self.peek() == Some(b'{') {
            self.bump();
            let columns = self.check_header()?;
            self.skip_trivia();
            if self.peek() != Some(b'=') {
                return self.fail("expected '=' after table header");
            }
            self.bump();
            self.check_table_rows(len, columns)
        } else {
            if self.peek() != Some(b'=') {
                return self.fail("expected '=' after array length");
            }
            self.bump();
            self.check_elements(len)
        }
    }

    fn check_length(&mut self) -> Result<usize, Stop> {
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end == start {
            self.record("expected array length");
            return Err(Stop);
        }
        let digits = &self.input[start..end];
        let parsed = digits.parse::<usize>();
        self.advance_over(end - start);
        match parsed {
            Ok(len) => Ok(len),
            Err(_) => {
                self.record("invalid length literal");
                Err(Stop)
            }
        }
    }

    fn check_header(&mut self) -> Result<usize, Stop> {
        let mut columns = 0;
        loop {
            self.skip_trivia();
            self.check_key()?;
            columns += 1;
            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(b'}') => {
                    self.bump();
                    return Ok(columns);
                }
                _ => {
                    self.record("expected ',' or '}' in table header");
                    return Err(Stop);
                }
            }
        }
    }

    fn check_table_rows(&mut self, len: usize, columns: usize) -> Check {
        if len == 0 {
            return Ok(());
        }
        for r in 0..len {
            self.skip_trivia();
            if r > 0 {
                if self.peek() != Some(b';') {
                    return self
                        .fail(format!("table declared {len} rows but input ended after {r}"));
                }
                self.bump();
            }
            for c in 0..columns {
                self.skip_trivia();
                if c > 0 {
                    if self.peek() != Some(b',') {
                        return self.fail(format!(
                            "table row {} has {} of {} columns",
                            r + 1,
                            c,
                            columns
                        ));
                    }
                    self.bump();
                }
                let last = r + 1 == len && c + 1 == columns;
                self.check_scalar(last)?;
            }
        }
        Ok(())
    }

    fn check_elements(&mut self, len: usize) -> Check {
        if len == 0 {
            return Ok(());
        }
        for i in 0..len {
            self.skip_trivia();
            if i > 0 {
                if self.peek() != Some(b',') {
                    return self.fail(format!(
                        "array declared {len} elements but input ended after {i}"
                    ));
                }
                self.bump();
            }
            self.check_value(i + 1 == len)?;
        }
        Ok(())
    }

    fn check_value(&mut self, boundary: bool) -> Check {
        self.skip_trivia();
        match self.peek() {
            Some(b'(') => {
                self.bump();
                self.check_object()
            }
            Some(b'[') => {
                self.bump();
                self.check_array()
            }
            _ => self.check_scalar(boundary),
        }
    }

    fn check_scalar(&mut self, boundary: bool) -> Check {
        self.skip_trivia();
        if self.peek() == Some(b'"') {
            return self.check_quoted();
        }
        let bytes = self.input.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && !grammar::is_terminator_byte(bytes[end]) {
            end += 1;
        }
        if boundary {
            if let Some(cut) = crate::decode::key_boundary_in(bytes, start, end) {
                end = cut;
            }
        }
        if end == start {
            return self.fail("expected a value");
        }
        self.advance_over(end - start);
        Ok(())
    }

    fn check_quoted(&mut self) -> Check {
        self.bump(); // opening quote
        loop {
            match self.bump() {
                Some('"') => return Ok(()),
                Some('\\') => match self.bump() {
                    Some('"' | '\\' | 'n' | 'r' | 't') => {}
                    Some(other) => return self.fail(format!("unsupported escape '\\{other}'")),
                    None => return self.fail("unterminated string"),
                },
                Some(_) => {}
                None => return self.fail("unterminated string"),
            }
        }
    }
}
