//! # strictjson
//!
//! A strict, standards-conformant JSON parser and serializer.
//!
//! The parser enforces RFC 8259 with byte-exact UTF-8 validation: overlong
//! encodings, surrogate halves encoded as UTF-8, and codepoints above
//! U+10FFFF are all rejected with a dedicated [`Status`]. Valid inputs
//! round-trip bit-exactly through [`Value`] and back to text.
//!
//! ```
//! use strictjson::Value;
//!
//! let doc = Value::parse(br#"{"pi": 3.14, "tags": ["a", "b"]}"#).unwrap();
//! assert_eq!(doc["pi"].as_double(), Some(3.14));
//! assert_eq!(doc.to_string(), r#"{"pi":3.14,"tags":["a","b"]}"#);
//! ```
//!
//! Documents are mutable in place; indexing with `&mut` access converts
//! scalars into containers on demand:
//!
//! ```
//! use strictjson::Value;
//!
//! let mut doc = Value::Null;
//! doc["greeting"] = Value::from("hello");
//! doc["items"][2] = Value::from(3);
//! assert_eq!(doc.to_string(), r#"{"greeting":"hello","items":[null,null,3]}"#);
//! ```

mod number;
mod parse;
mod ser;
mod value;

pub use parse::Status;
pub use value::Value;
