//! The CTON wire format.
//!
//! This module documents the format this library reads and writes.
//!
//! # Overview
//!
//! CTON (Compact Token-Oriented Notation) is a JSON-isomorphic text format
//! built for contexts where structural characters are expensive, such as
//! LLM prompts. It keeps the JSON data model — objects, arrays, strings,
//! numbers, booleans, null — and spends as few bytes on structure as the
//! grammar allows.
//!
//! Encoding is UTF-8 throughout.
//!
//! # Documents
//!
//! A document is a sequence of top-level key/value pairs:
//!
//! ```text
//! name=Ada
//! languages[2]=rust,lisp
//! contact(email="ada@example.com",city=London)
//! ```
//!
//! The pair shape depends on the value:
//!
//! | Value | Form | Example |
//! |-------|------|---------|
//! | scalar | `key=scalar` | `age=36` |
//! | object | `key(pairs)` | `contact(city=London)` |
//! | array | `key[N]=body` | `tags[2]=a,b` |
//!
//! Keys match `[0-9A-Za-z_.:-]+` and are never quoted.
//!
//! The byte string between top-level pairs is the writer's choice
//! (`\n` by default). The empty separator is legal: `a=1b=2` is two pairs,
//! recovered by the key-boundary rule below.
//!
//! A root value that is not an object is written as one standalone value:
//! `[3]=1,2,3` or `42` or `"hello world"`.
//!
//! # Scalars
//!
//! | Type | Syntax | Example |
//! |------|--------|---------|
//! | Null | `null` | `value=null` |
//! | Boolean | `true` / `false` | `active=true` |
//! | Integer | optional `-`, decimal digits | `count=42` |
//! | Decimal | positional notation only | `price=19.99` |
//! | String | bare token or `"quoted"` | `name=Ada` |
//!
//! Numbers are canonical: no exponents, no leading `+`, no leading zeros,
//! no trailing fractional zeros, and negative zero collapses to `0`.
//! Non-finite floats (NaN, ±∞) are written as `null`.
//!
//! ## Strings and quoting
//!
//! A string is written bare iff it consists only of `[0-9A-Za-z_.:-]`, is
//! not `true`/`false`/`null`, and does not look like a number. Everything
//! else is double-quoted:
//!
//! ```text
//! city=Boulder            # bare
//! task="Our favorite hikes together"
//! flag="true"             # quoted: reserved literal
//! id="007"                # quoted: number lookalike
//! ```
//!
//! The escape set inside quotes is exactly `\"`, `\\`, `\n`, `\r`, `\t`.
//! Any other character, including other control characters, passes through
//! raw. An unknown escape is a parse error.
//!
//! # Objects
//!
//! `()` is the empty object; otherwise pairs separated by `,`:
//!
//! ```text
//! ctx(task=demo,nested(deep=true),tags[2]=a,b)
//! ```
//!
//! # Arrays
//!
//! Every array carries its length. The empty array is `[0]=`.
//!
//! ## List form
//!
//! `[N]=` followed by N comma-separated elements. Elements may be scalars,
//! quoted strings, objects `(…)`, or nested arrays:
//!
//! ```text
//! friends[3]=ana,luis,sam
//! mixed[3]=1,(a=2),[2]=x,y
//! ```
//!
//! ## Table form
//!
//! When every element is an object with the same non-empty key sequence
//! and only scalar values, the keys are written once:
//!
//! ```text
//! hikes[2]{id,name,km}=1,"Blue Lake Trail",7.5;2,"Ridge Overlook",9.2
//! ```
//!
//! Rows are separated by `;`, columns by `,`, in header order. The decoder
//! rebuilds one object per row.
//!
//! # Comments
//!
//! `#` starts a comment running to end of line, allowed anywhere
//! whitespace is. Comments are discarded on decode; the encoder emits them
//! only through its `comments` option, before top-level pairs:
//!
//! ```text
//! # sorted by date
//! hikes[2]{id,name}=1,a;2,b
//! ```
//!
//! # The key-boundary rule
//!
//! With an empty separator, `a=1b=2` concatenates two pairs. When reading
//! an unquoted scalar in top-level position (or the final slot of an array
//! body), the scalar ends at the first position where a run of key
//! characters starts with a letter, `_`, `.`, or `:` and is immediately
//! followed by `(`, `[`, or `=`. Digit- and `-`-led runs never open a
//! boundary, so numeric payloads stay whole.
//!
//! The asymmetry is deliberate: treating digit-led runs as boundaries
//! would make `k=123` unparseable. Keys that begin with a digit are legal,
//! but cannot be placed immediately after a numeric scalar in a
//! separator-less stream.
//!
//! # Grammar
//!
//! ```text
//! document      ::= pair (SEP pair)* | value
//! pair          ::= KEY ( "(" obj ")" | "[" array-body | "=" scalar )
//! obj           ::= "" | pair ("," pair)*
//! array-body    ::= N "]" ( "{" KEY ("," KEY)* "}" )? "=" body?
//! body (table)  ::= row (";" row)*       row ::= scalar ("," scalar)*
//! body (list)   ::= value ("," value)*
//! value         ::= "(" obj ")" | "[" array-body | scalar
//! scalar        ::= quoted-string | safe-token
//! quoted-string ::= '"' (char | escape)* '"'
//! escape        ::= "\" ( "n" | "r" | "t" | '"' | "\" )
//! KEY           ::= [0-9A-Za-z_.:-]+
//! ```
//!
//! # Canonical form
//!
//! For any tree, the encoder produces exactly one byte string, and
//! re-encoding a decoded document reproduces it (comments aside). This is
//! what makes CTON output diffable and cacheable.

// This module contains only documentation; no implementation code.
