//! A sink that assembles tokens into a [`serde_json::Value`].
//!
//! This is the in-memory token buffer: the tree filter uses it to materialize
//! a document, and tests use it to read streaming output back as a tree.

use serde_json::{Map, Number, Value};

use crate::error::{FilterError, FilterResult};
use crate::sink::TokenSink;

/// A container under construction.
enum Partial {
    Object {
        map: Map<String, Value>,
        pending: Option<String>,
    },
    Array(Vec<Value>),
}

/// Builds a single [`Value`] from a token stream.
#[derive(Default)]
pub struct ValueBuilder {
    stack: Vec<Partial>,
    root: Option<Value>,
    closed: bool,
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the completed value.
    ///
    /// Fails if containers are still open or nothing was written.
    pub fn finish(self) -> FilterResult<Value> {
        if !self.stack.is_empty() {
            return Err(FilterError::InvalidState(format!(
                "{} container(s) still open",
                self.stack.len()
            )));
        }
        self.root
            .ok_or_else(|| FilterError::InvalidState("no value was written".into()))
    }

    /// Check that a value may be written at the current position.
    fn check_slot(&self) -> FilterResult<()> {
        if self.closed {
            return Err(FilterError::Closed);
        }
        match self.stack.last() {
            None if self.root.is_some() => Err(FilterError::InvalidState(
                "a root value was already written".into(),
            )),
            Some(Partial::Object { pending: None, .. }) => Err(FilterError::InvalidState(
                "object value written without a field name".into(),
            )),
            _ => Ok(()),
        }
    }

    fn push_value(&mut self, value: Value) -> FilterResult<()> {
        self.check_slot()?;
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Partial::Array(items)) => items.push(value),
            Some(Partial::Object { map, pending }) => {
                if let Some(name) = pending.take() {
                    map.insert(name, value);
                }
            }
        }
        Ok(())
    }

    fn open(&mut self, partial: Partial) -> FilterResult<()> {
        self.check_slot()?;
        self.stack.push(partial);
        Ok(())
    }
}

impl TokenSink for ValueBuilder {
    fn start_object(&mut self) -> FilterResult<()> {
        self.open(Partial::Object {
            map: Map::new(),
            pending: None,
        })
    }

    fn end_object(&mut self) -> FilterResult<()> {
        if self.closed {
            return Err(FilterError::Closed);
        }
        match self.stack.pop() {
            Some(Partial::Object { map, pending: None }) => self.push_value(Value::Object(map)),
            Some(partial) => {
                self.stack.push(partial);
                Err(FilterError::InvalidState(
                    "end of object does not match the open container".into(),
                ))
            }
            None => Err(FilterError::InvalidState(
                "end of object without a matching start".into(),
            )),
        }
    }

    fn start_array(&mut self) -> FilterResult<()> {
        self.open(Partial::Array(Vec::new()))
    }

    fn end_array(&mut self) -> FilterResult<()> {
        if self.closed {
            return Err(FilterError::Closed);
        }
        match self.stack.pop() {
            Some(Partial::Array(items)) => self.push_value(Value::Array(items)),
            Some(partial) => {
                self.stack.push(partial);
                Err(FilterError::InvalidState(
                    "end of array does not match the open container".into(),
                ))
            }
            None => Err(FilterError::InvalidState(
                "end of array without a matching start".into(),
            )),
        }
    }

    fn write_field_name(&mut self, name: &str) -> FilterResult<()> {
        if self.closed {
            return Err(FilterError::Closed);
        }
        match self.stack.last_mut() {
            Some(Partial::Object { pending, .. }) if pending.is_none() => {
                *pending = Some(name.to_owned());
                Ok(())
            }
            _ => Err(FilterError::InvalidState(format!(
                "field name {name:?} written outside of an object key position"
            ))),
        }
    }

    fn write_string(&mut self, value: &str) -> FilterResult<()> {
        self.push_value(Value::String(value.to_owned()))
    }

    fn write_number(&mut self, value: &Number) -> FilterResult<()> {
        self.push_value(Value::Number(value.clone()))
    }

    fn write_bool(&mut self, value: bool) -> FilterResult<()> {
        self.push_value(Value::Bool(value))
    }

    fn write_null(&mut self) -> FilterResult<()> {
        self.push_value(Value::Null)
    }

    fn flush(&mut self) -> FilterResult<()> {
        Ok(())
    }

    fn close(&mut self) -> FilterResult<()> {
        self.closed = true;
        Ok(())
    }
}
