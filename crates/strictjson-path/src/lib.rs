//! # strictjson-path
//!
//! JSONPath queries, updates and deletes over [`strictjson`] documents.
//!
//! Path expressions are compiled to a step program and memoized in a
//! per-thread, 64-entry LRU cache, so repeated queries with the same text
//! skip the compiler entirely.
//!
//! ```
//! use strictjson::Value;
//! use strictjson_path::{delete, query, update};
//!
//! let mut doc = Value::parse(br#"{
//!     "store": {"book": [
//!         {"title": "Sayings of the Century", "price": 8.95},
//!         {"title": "Sword of Honour", "price": 12.99}
//!     ]}
//! }"#).unwrap();
//!
//! let cheap = query(&doc, "$.store.book[?(@.price < 10)].title").unwrap();
//! assert_eq!(cheap[0].as_str(), Some("Sayings of the Century"));
//!
//! assert_eq!(update(&mut doc, "$.store.book[*].price", Value::from(9.99)).unwrap(), 2);
//! assert_eq!(delete(&mut doc, "$.store.book[1].title").unwrap(), 1);
//! ```
//!
//! The supported grammar is the classic Goessner subset: child and
//! recursive-descent segments, wildcards, signed indices, slices, unions,
//! and `?(...)` filter expressions with comparisons, `&&`/`||`/`!`, regex
//! matching via `=~`, and the `length`/`size`/`count` functions.

mod ast;
mod cache;
mod compiler;
mod error;
mod eval;
mod filter;
mod mutate;

pub use ast::CompiledPath;
pub use error::PathError;
pub use mutate::{delete, update};

use eval::RefCursor;
use strictjson::Value;

/// Compile `expression` without touching the per-thread cache.
pub fn compile(expression: &str) -> Result<CompiledPath, PathError> {
    compiler::PathParser::new(expression).parse()
}

/// Evaluate `expression` against `root` and return the matched nodes in
/// document order (duplicates are possible with recursive descent).
///
/// Top-level expressions must be absolute: a `@` root is a runtime error
/// outside filter expressions.
pub fn query<'a>(root: &'a Value, expression: &str) -> Result<Vec<&'a Value>, PathError> {
    let compiled = cache::compiled(expression)?;
    if compiled.relative {
        return Err(PathError::runtime("JSONPath expression must start with '$'"));
    }
    let matches = eval::evaluate(RefCursor(root), &compiled.steps, root)?;
    Ok(matches.into_iter().map(|cursor| cursor.0).collect())
}

/// Evaluate an already-compiled path against `root`.
pub fn query_compiled<'a>(
    root: &'a Value,
    path: &CompiledPath,
) -> Result<Vec<&'a Value>, PathError> {
    if path.relative {
        return Err(PathError::runtime("JSONPath expression must start with '$'"));
    }
    let matches = eval::evaluate(RefCursor(root), &path.steps, root)?;
    Ok(matches.into_iter().map(|cursor| cursor.0).collect())
}
