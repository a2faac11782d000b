//! Compact JSON text sink over any [`std::io::Write`].

use std::io::{self, Write};

use serde_json::Number;

use crate::error::{FilterError, FilterResult};
use crate::sink::TokenSink;

/// Open container state tracked by the writer for separators and validation.
#[derive(Clone, Copy, Debug)]
enum Scope {
    Object { first: bool, awaiting_value: bool },
    Array { first: bool },
}

/// Writes tokens as compact JSON text.
///
/// String escaping is delegated to `serde_json`. Token order is validated:
/// field names are only accepted where a key is expected, values inside an
/// object need a preceding field name, and end tokens must match the open
/// container. Consecutive root values are separated by a newline.
///
/// `close` flushes the target but does not drop it; use
/// [`JsonWriter::into_inner`] to take it back.
pub struct JsonWriter<W: Write> {
    writer: W,
    scopes: Vec<Scope>,
    roots: usize,
    closed: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            scopes: Vec::new(),
            roots: 0,
            closed: false,
        }
    }

    /// Take the target back.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn ensure_open(&self) -> FilterResult<()> {
        if self.closed {
            Err(FilterError::Closed)
        } else {
            Ok(())
        }
    }

    /// Emit whatever separator precedes a value in the current scope.
    fn begin_value(&mut self) -> FilterResult<()> {
        self.ensure_open()?;
        match self.scopes.last_mut() {
            None => {
                if self.roots > 0 {
                    self.writer.write_all(b"\n")?;
                }
                self.roots += 1;
            }
            Some(Scope::Array { first }) => {
                if !*first {
                    self.writer.write_all(b",")?;
                }
                *first = false;
            }
            Some(Scope::Object { awaiting_value, .. }) => {
                if !*awaiting_value {
                    return Err(FilterError::InvalidState(
                        "object value written without a field name".into(),
                    ));
                }
                *awaiting_value = false;
            }
        }
        Ok(())
    }

    fn write_serialized(&mut self, value: &str) -> FilterResult<()> {
        serde_json::to_writer(&mut self.writer, value).map_err(io::Error::from)?;
        Ok(())
    }
}

impl<W: Write> TokenSink for JsonWriter<W> {
    fn start_object(&mut self) -> FilterResult<()> {
        self.begin_value()?;
        self.writer.write_all(b"{")?;
        self.scopes.push(Scope::Object {
            first: true,
            awaiting_value: false,
        });
        Ok(())
    }

    fn end_object(&mut self) -> FilterResult<()> {
        self.ensure_open()?;
        match self.scopes.last() {
            Some(Scope::Object {
                awaiting_value: false,
                ..
            }) => {
                self.scopes.pop();
                self.writer.write_all(b"}")?;
                Ok(())
            }
            Some(Scope::Object { .. }) => Err(FilterError::InvalidState(
                "object closed while a field value is pending".into(),
            )),
            _ => Err(FilterError::InvalidState(
                "end of object without a matching start".into(),
            )),
        }
    }

    fn start_array(&mut self) -> FilterResult<()> {
        self.begin_value()?;
        self.writer.write_all(b"[")?;
        self.scopes.push(Scope::Array { first: true });
        Ok(())
    }

    fn end_array(&mut self) -> FilterResult<()> {
        self.ensure_open()?;
        match self.scopes.last() {
            Some(Scope::Array { .. }) => {
                self.scopes.pop();
                self.writer.write_all(b"]")?;
                Ok(())
            }
            _ => Err(FilterError::InvalidState(
                "end of array without a matching start".into(),
            )),
        }
    }

    fn write_field_name(&mut self, name: &str) -> FilterResult<()> {
        self.ensure_open()?;
        match self.scopes.last_mut() {
            Some(Scope::Object {
                first,
                awaiting_value,
            }) if !*awaiting_value => {
                let separate = !*first;
                *first = false;
                *awaiting_value = true;
                if separate {
                    self.writer.write_all(b",")?;
                }
                self.write_serialized(name)?;
                self.writer.write_all(b":")?;
                Ok(())
            }
            _ => Err(FilterError::InvalidState(format!(
                "field name {name:?} written outside of an object key position"
            ))),
        }
    }

    fn write_string(&mut self, value: &str) -> FilterResult<()> {
        self.begin_value()?;
        self.write_serialized(value)
    }

    fn write_number(&mut self, value: &Number) -> FilterResult<()> {
        self.begin_value()?;
        write!(self.writer, "{value}")?;
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> FilterResult<()> {
        self.begin_value()?;
        self.writer
            .write_all(if value { b"true" } else { b"false" })?;
        Ok(())
    }

    fn write_null(&mut self) -> FilterResult<()> {
        self.begin_value()?;
        self.writer.write_all(b"null")?;
        Ok(())
    }

    fn flush(&mut self) -> FilterResult<()> {
        self.ensure_open()?;
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> FilterResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(writer: JsonWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn writes_nested_document() {
        let mut w = JsonWriter::new(Vec::new());
        w.start_object().unwrap();
        w.write_field_name("a").unwrap();
        w.write_number(&Number::from(1)).unwrap();
        w.write_field_name("b").unwrap();
        w.start_array().unwrap();
        assert_eq!(w.depth(), 2);
        w.write_bool(true).unwrap();
        w.write_null().unwrap();
        w.write_string("x\"y").unwrap();
        w.end_array().unwrap();
        w.end_object().unwrap();
        assert_eq!(w.depth(), 0);
        w.close().unwrap();
        assert_eq!(text(w), r#"{"a":1,"b":[true,null,"x\"y"]}"#);
    }

    #[test]
    fn escapes_field_names() {
        let mut w = JsonWriter::new(Vec::new());
        w.start_object().unwrap();
        w.write_field_name("line\nbreak").unwrap();
        w.write_null().unwrap();
        w.end_object().unwrap();
        assert_eq!(text(w), r#"{"line\nbreak":null}"#);
    }

    #[test]
    fn root_values_separated_by_newline() {
        let mut w = JsonWriter::new(Vec::new());
        w.write_number(&Number::from(1)).unwrap();
        w.start_object().unwrap();
        w.end_object().unwrap();
        assert_eq!(text(w), "1\n{}");
    }

    #[test]
    fn rejects_value_without_field_name() {
        let mut w = JsonWriter::new(Vec::new());
        w.start_object().unwrap();
        let err = w.write_null().unwrap_err();
        assert!(matches!(err, FilterError::InvalidState(_)));
    }

    #[test]
    fn rejects_field_name_in_array() {
        let mut w = JsonWriter::new(Vec::new());
        w.start_array().unwrap();
        let err = w.write_field_name("a").unwrap_err();
        assert!(matches!(err, FilterError::InvalidState(_)));
    }

    #[test]
    fn rejects_mismatched_end() {
        let mut w = JsonWriter::new(Vec::new());
        w.start_array().unwrap();
        assert!(matches!(
            w.end_object().unwrap_err(),
            FilterError::InvalidState(_)
        ));

        let mut w = JsonWriter::new(Vec::new());
        w.start_object().unwrap();
        w.write_field_name("a").unwrap();
        assert!(matches!(
            w.end_object().unwrap_err(),
            FilterError::InvalidState(_)
        ));
    }

    #[test]
    fn writes_after_close_fail() {
        let mut w = JsonWriter::new(Vec::new());
        w.close().unwrap();
        w.close().unwrap();
        assert!(matches!(w.write_null().unwrap_err(), FilterError::Closed));
    }

    #[test]
    fn io_errors_propagate() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut w = JsonWriter::new(Broken);
        let err = w.start_array().unwrap_err();
        match err {
            FilterError::Io(io) => assert_eq!(io.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected Io, got {:?}", other),
        }
    }
}
