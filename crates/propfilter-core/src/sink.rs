//! The token-stream sink contract.
//!
//! A [`TokenSink`] receives a JSON document one token at a time: container
//! boundaries, field names and scalars. Sinks are write-only and forward-only.
//! The streaming filter is itself a sink, so it can stand in anywhere a sink
//! is expected.

use serde_json::Number;
use tracing::warn;

use crate::error::FilterResult;

/// A write-only consumer of JSON tokens.
///
/// Implementations must satisfy these invariants:
/// - Tokens arrive in document order; a sink never sees a token twice.
/// - Every error from the underlying target is returned unchanged.
/// - `close` releases the target; writes after `close` fail.
pub trait TokenSink {
    /// Open an object.
    fn start_object(&mut self) -> FilterResult<()>;

    /// Close the innermost open object.
    fn end_object(&mut self) -> FilterResult<()>;

    /// Open an array.
    fn start_array(&mut self) -> FilterResult<()>;

    /// Close the innermost open array.
    fn end_array(&mut self) -> FilterResult<()>;

    /// Write the name of the next property in the innermost open object.
    fn write_field_name(&mut self, name: &str) -> FilterResult<()>;

    fn write_string(&mut self, value: &str) -> FilterResult<()>;

    fn write_number(&mut self, value: &Number) -> FilterResult<()>;

    fn write_bool(&mut self, value: bool) -> FilterResult<()>;

    fn write_null(&mut self) -> FilterResult<()>;

    /// Push buffered output to the target.
    fn flush(&mut self) -> FilterResult<()>;

    /// Flush and release the target.
    fn close(&mut self) -> FilterResult<()>;
}

impl<S: TokenSink + ?Sized> TokenSink for &mut S {
    fn start_object(&mut self) -> FilterResult<()> {
        (**self).start_object()
    }

    fn end_object(&mut self) -> FilterResult<()> {
        (**self).end_object()
    }

    fn start_array(&mut self) -> FilterResult<()> {
        (**self).start_array()
    }

    fn end_array(&mut self) -> FilterResult<()> {
        (**self).end_array()
    }

    fn write_field_name(&mut self, name: &str) -> FilterResult<()> {
        (**self).write_field_name(name)
    }

    fn write_string(&mut self, value: &str) -> FilterResult<()> {
        (**self).write_string(value)
    }

    fn write_number(&mut self, value: &Number) -> FilterResult<()> {
        (**self).write_number(value)
    }

    fn write_bool(&mut self, value: bool) -> FilterResult<()> {
        (**self).write_bool(value)
    }

    fn write_null(&mut self) -> FilterResult<()> {
        (**self).write_null()
    }

    fn flush(&mut self) -> FilterResult<()> {
        (**self).flush()
    }

    fn close(&mut self) -> FilterResult<()> {
        (**self).close()
    }
}

/// Run `write` against `sink`, then close the sink on every exit path.
///
/// If `write` fails, its error is returned and a failure from the following
/// `close` is logged and discarded. If `write` succeeds, a `close` failure is
/// returned.
pub fn write_scoped<S, F>(sink: &mut S, write: F) -> FilterResult<()>
where
    S: TokenSink + ?Sized,
    F: FnOnce(&mut S) -> FilterResult<()>,
{
    match write(sink) {
        Ok(()) => sink.close(),
        Err(err) => {
            if let Err(close_err) = sink.close() {
                warn!(error = %close_err, "sink close failed after write error; keeping the write error");
            }
            Err(err)
        }
    }
}
