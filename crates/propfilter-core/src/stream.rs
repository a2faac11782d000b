//! Streaming property filter.
//!
//! [`PropertyFilteringSink`] wraps another [`TokenSink`] and forwards only the
//! tokens that survive the whitelist. It never buffers the document. Its only
//! state is one [`Frame`] per open container plus a flag for the value that
//! follows a rejected field name, so auxiliary memory grows with nesting depth
//! and not with document size.
//!
//! # Token handling
//!
//! | Event | innermost frame pass-through (or none) | innermost frame suppressed |
//! |---|---|---|
//! | field name | forward if allowed, else arm skip-next-value | ignore |
//! | container start | skip armed: push suppressed; else forward, push pass-through | push suppressed |
//! | container end | pop, forward | pop |
//! | scalar | skip armed: drop; else forward | drop |

use serde_json::Number;
use tracing::{debug, trace};

use crate::error::FilterResult;
use crate::names::NameSet;
use crate::sink::TokenSink;

/// Per-container state on the suppression stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    /// The container was forwarded; its fields are checked by name.
    PassThrough,
    /// The container belongs to a rejected branch; nothing inside is forwarded.
    Suppressed,
}

/// Counters collected while filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Field names that were allowed and forwarded.
    pub kept_fields: u64,
    /// Field names that were rejected, each dropping its whole value.
    pub dropped_fields: u64,
    /// Deepest container nesting seen.
    pub max_depth: usize,
}

/// A [`TokenSink`] decorator that drops properties whose names are not in a
/// [`NameSet`], at every depth.
///
/// Fields inside a rejected branch are never examined. Arrays are never
/// filtered by themselves; only the field that introduced them can be.
///
/// # Examples
///
/// ```
/// use propfilter_core::{write_value, JsonWriter, NameSet, PropertyFilteringSink};
/// use serde_json::json;
///
/// let names = NameSet::new(["items", "id"]);
/// let mut sink = PropertyFilteringSink::new(JsonWriter::new(Vec::new()), &names);
/// write_value(&json!({"items": [{"id": 1, "x": 2}, {"id": 3}]}), &mut sink).unwrap();
///
/// let out = sink.into_inner().into_inner();
/// assert_eq!(out, br#"{"items":[{"id":1},{"id":3}]}"#);
/// ```
pub struct PropertyFilteringSink<'n, S> {
    inner: S,
    names: &'n NameSet,
    stack: Vec<Frame>,
    /// Set by a rejected field name; consumed by the value that follows it.
    skip_next: bool,
    stats: FilterStats,
    closed: bool,
}

impl<'n, S: TokenSink> PropertyFilteringSink<'n, S> {
    /// Wrap `inner`, allowing only the properties named in `names`.
    pub fn new(inner: S, names: &'n NameSet) -> Self {
        Self {
            inner,
            names,
            stack: Vec::new(),
            skip_next: false,
            stats: FilterStats::default(),
            closed: false,
        }
    }

    /// Current container nesting depth, which is also the suppression stack
    /// size.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Borrow the wrapped sink.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the decorator and return the wrapped sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn suppressed(&self) -> bool {
        self.stack.last() == Some(&Frame::Suppressed)
    }

    fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
    }

    fn open(&mut self, start: impl FnOnce(&mut S) -> FilterResult<()>) -> FilterResult<()> {
        let skip = std::mem::take(&mut self.skip_next);
        if skip || self.suppressed() {
            self.push(Frame::Suppressed);
            return Ok(());
        }
        start(&mut self.inner)?;
        self.push(Frame::PassThrough);
        Ok(())
    }

    fn close_container(
        &mut self,
        end: impl FnOnce(&mut S) -> FilterResult<()>,
    ) -> FilterResult<()> {
        match self.stack.pop() {
            Some(Frame::Suppressed) => Ok(()),
            // An unmatched end is forwarded so the wrapped sink can reject it.
            Some(Frame::PassThrough) | None => end(&mut self.inner),
        }
    }

    fn scalar(&mut self, write: impl FnOnce(&mut S) -> FilterResult<()>) -> FilterResult<()> {
        let skip = std::mem::take(&mut self.skip_next);
        if skip || self.suppressed() {
            return Ok(());
        }
        write(&mut self.inner)
    }
}

impl<S: TokenSink> TokenSink for PropertyFilteringSink<'_, S> {
    fn start_object(&mut self) -> FilterResult<()> {
        self.open(|inner| inner.start_object())
    }

    fn end_object(&mut self) -> FilterResult<()> {
        self.close_container(|inner| inner.end_object())
    }

    fn start_array(&mut self) -> FilterResult<()> {
        self.open(|inner| inner.start_array())
    }

    fn end_array(&mut self) -> FilterResult<()> {
        self.close_container(|inner| inner.end_array())
    }

    fn write_field_name(&mut self, name: &str) -> FilterResult<()> {
        if self.suppressed() {
            return Ok(());
        }
        if self.names.contains(name) {
            self.stats.kept_fields += 1;
            self.inner.write_field_name(name)
        } else {
            trace!(field = name, depth = self.stack.len(), "dropping property");
            self.stats.dropped_fields += 1;
            self.skip_next = true;
            Ok(())
        }
    }

    fn write_string(&mut self, value: &str) -> FilterResult<()> {
        self.scalar(|inner| inner.write_string(value))
    }

    fn write_number(&mut self, value: &Number) -> FilterResult<()> {
        self.scalar(|inner| inner.write_number(value))
    }

    fn write_bool(&mut self, value: bool) -> FilterResult<()> {
        self.scalar(|inner| inner.write_bool(value))
    }

    fn write_null(&mut self) -> FilterResult<()> {
        self.scalar(|inner| inner.write_null())
    }

    fn flush(&mut self) -> FilterResult<()> {
        self.inner.flush()
    }

    /// Close the wrapped sink. Only the first call reaches it.
    fn close(&mut self) -> FilterResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(
            kept = self.stats.kept_fields,
            dropped = self.stats.dropped_fields,
            max_depth = self.stats.max_depth,
            "property filter closed"
        );
        self.inner.close()
    }
}
