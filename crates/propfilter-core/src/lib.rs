//! Property whitelist filtering for JSON documents.
//!
//! Keeps only the object properties whose names are in a [`NameSet`], at every
//! nesting level. A rejected property is dropped with its whole value, which is
//! never searched for allowed names. Two equivalent filters are provided:
//!
//! - [`PropertyFilteringSink`] -- a [`TokenSink`] decorator that filters while
//!   the document is being written, using memory proportional to nesting depth
//! - [`tree::filter`] -- prunes an already-built [`serde_json::Value`]
//!
//! # Key Types
//!
//! - [`NameSet`] -- immutable, shareable whitelist
//! - [`TokenSink`] -- the write-only token stream contract
//! - [`JsonWriter`] / [`ValueBuilder`] -- sinks producing JSON text or a tree
//! - [`TokenSerializer`] -- drives any sink from a `T: Serialize`
//! - [`FilterConfig`] / [`FilterMode`] -- TOML configuration

pub mod builder;
pub mod config;
pub mod error;
pub mod json;
pub mod names;
pub mod ser;
pub mod sink;
pub mod stream;
pub mod tree;

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

pub use builder::ValueBuilder;
pub use config::{FilterConfig, FilterMode};
pub use error::{FilterError, FilterResult};
pub use json::JsonWriter;
pub use names::NameSet;
pub use ser::{write_value, TokenSerializer};
pub use sink::{write_scoped, TokenSink};
pub use stream::{FilterStats, PropertyFilteringSink};

/// Serialize `value` to `writer` as compact JSON, unfiltered.
pub fn to_writer<W, T>(writer: W, value: &T) -> FilterResult<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    let mut sink = JsonWriter::new(writer);
    write_scoped(&mut sink, |sink| write_value(value, sink))
}

/// Serialize `value` to `writer`, filtering properties as tokens are written.
pub fn to_writer_filtered<W, T>(writer: W, value: &T, names: &NameSet) -> FilterResult<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    let mut sink = PropertyFilteringSink::new(JsonWriter::new(writer), names);
    write_scoped(&mut sink, |sink| write_value(value, sink))
}

/// Serialize `value` to a byte vector with the streaming filter.
pub fn to_vec_filtered<T>(value: &T, names: &NameSet) -> FilterResult<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut out = Vec::new();
    to_writer_filtered(&mut out, value, names)?;
    Ok(out)
}

/// Serialize `value` to a string with the streaming filter.
///
/// # Examples
///
/// ```
/// use propfilter_core::{to_string_filtered, NameSet};
/// use serde_json::json;
///
/// let names = NameSet::new(["a"]);
/// let out = to_string_filtered(&json!({"a": 1, "b": {"a": 2}}), &names).unwrap();
/// assert_eq!(out, r#"{"a":1}"#);
/// ```
pub fn to_string_filtered<T>(value: &T, names: &NameSet) -> FilterResult<String>
where
    T: ?Sized + Serialize,
{
    let bytes = to_vec_filtered(value, names)?;
    String::from_utf8(bytes).map_err(|e| FilterError::Serialization(e.to_string()))
}

/// Stream `value` through the filter into a tree.
pub fn to_value_filtered<T>(value: &T, names: &NameSet) -> FilterResult<Value>
where
    T: ?Sized + Serialize,
{
    let mut sink = PropertyFilteringSink::new(ValueBuilder::new(), names);
    write_scoped(&mut sink, |sink| write_value(value, sink))?;
    sink.into_inner().finish()
}

/// Materialize `value` as a tree through the token stream, unfiltered.
pub fn to_tree<T>(value: &T) -> FilterResult<Value>
where
    T: ?Sized + Serialize,
{
    let mut builder = ValueBuilder::new();
    write_scoped(&mut builder, |sink| write_value(value, sink))?;
    builder.finish()
}

/// Serialize `value` to `writer` with the tree filter: build the tree, prune
/// it, then write it.
pub fn to_writer_pruned<W, T>(writer: W, value: &T, names: &NameSet) -> FilterResult<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    let mut document = to_tree(value)?;
    tree::filter_in_place(&mut document, names);
    to_writer(writer, &document)
}
