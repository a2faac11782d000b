//! The whitelist of property names shared by both filters.
//!
//! A [`NameSet`] is immutable once built. Its storage is reference-counted, so
//! clones are cheap and a single set can be handed to filters running on
//! different threads.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FilterError, FilterResult};

/// An immutable, case-sensitive set of allowed property names.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NameSet {
    names: Arc<HashSet<String>>,
}

impl NameSet {
    /// Build a set from any sequence of names. Duplicates collapse.
    pub fn new<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            names: Arc::new(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Parse a comma-separated list such as `"id, name"`.
    ///
    /// Entries are trimmed and empty entries are skipped, so `"id,,name,"`
    /// yields `{"id", "name"}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use propfilter_core::NameSet;
    ///
    /// let names = NameSet::parse("id, name");
    /// assert!(names.contains("id"));
    /// assert!(names.contains("name"));
    /// assert!(!names.contains("ID"));
    /// ```
    pub fn parse(expr: &str) -> Self {
        Self::new(
            expr.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    /// Build a set from a JSON array of strings.
    ///
    /// Fails without producing a partial set if `value` is not an array or
    /// if any element (including `null`) is not a string.
    pub fn from_json(value: &Value) -> FilterResult<Self> {
        let items = value.as_array().ok_or_else(|| {
            FilterError::InvalidName(format!("expected an array of names, got {value}"))
        })?;

        let names = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str().map(str::to_owned).ok_or_else(|| {
                    FilterError::InvalidName(format!("entry {index} is not a string: {item}"))
                })
            })
            .collect::<FilterResult<Vec<_>>>()?;

        Ok(Self::new(names))
    }

    /// Returns `true` if `name` is allowed.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name is allowed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the names in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Debug for NameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names.iter()).finish()
    }
}

impl FromStr for NameSet {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        Ok(Self::parse(s))
    }
}

impl<T: Into<String>> FromIterator<T> for NameSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<String>> for NameSet {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<NameSet> for Vec<String> {
    fn from(set: NameSet) -> Self {
        let mut names: Vec<String> = set.iter().map(String::from).collect();
        names.sort();
        names
    }
}
