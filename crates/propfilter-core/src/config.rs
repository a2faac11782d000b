use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::json::JsonWriter;
use crate::names::NameSet;
use crate::ser::write_value;
use crate::sink::{write_scoped, TokenSink};
use crate::stream::PropertyFilteringSink;
use crate::tree;

/// Which of the two equivalent filters to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Filter tokens as they are written; memory grows with nesting depth.
    #[default]
    Streaming,
    /// Materialize the document, prune the tree, then write it.
    Tree,
}

impl FilterMode {
    /// Serialize `value` to `writer` with only the properties in `names`.
    pub fn write<W, T>(self, writer: W, value: &T, names: &NameSet) -> FilterResult<()>
    where
        W: Write,
        T: ?Sized + Serialize,
    {
        let mut sink = JsonWriter::new(writer);
        write_scoped(&mut sink, |sink| self.write_tokens(sink, value, names))
    }

    /// Emit the filtered tokens of `value` into `sink` without closing it.
    pub fn write_tokens<S, T>(self, sink: S, value: &T, names: &NameSet) -> FilterResult<()>
    where
        S: TokenSink,
        T: ?Sized + Serialize,
    {
        match self {
            Self::Streaming => write_value(value, PropertyFilteringSink::new(sink, names)),
            Self::Tree => {
                let mut document = crate::to_tree(value)?;
                tree::filter_in_place(&mut document, names);
                write_value(&document, sink)
            }
        }
    }
}

/// Property filter configuration, usually read from a TOML file:
///
/// ```toml
/// properties = ["id", "name"]
/// mode = "tree"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Allowed property names. Entries may themselves be comma-separated.
    pub properties: Vec<String>,
    /// Filter implementation to use.
    pub mode: FilterMode,
}

impl FilterConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> FilterResult<Self> {
        toml::from_str(text).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> FilterResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The whitelist described by `properties`.
    pub fn name_set(&self) -> NameSet {
        NameSet::parse(&self.properties.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config() {
        let c = FilterConfig::default();
        assert!(c.properties.is_empty());
        assert_eq!(c.mode, FilterMode::Streaming);
        assert!(c.name_set().is_empty());
    }

    #[test]
    fn parse_toml() {
        let c = FilterConfig::from_toml_str(
            r#"
            properties = ["id", "name, email"]
            mode = "tree"
            "#,
        )
        .unwrap();
        assert_eq!(c.mode, FilterMode::Tree);

        let names = c.name_set();
        assert_eq!(names.len(), 3);
        assert!(names.contains("email"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let c = FilterConfig::from_toml_str(r#"properties = ["id"]"#).unwrap();
        assert_eq!(c.mode, FilterMode::Streaming);
    }

    #[test]
    fn bad_mode_is_config_error() {
        let err = FilterConfig::from_toml_str(r#"mode = "lazy""#).unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.toml");
        std::fs::write(&path, "properties = [\"id\"]\n").unwrap();

        let c = FilterConfig::load(&path).unwrap();
        assert_eq!(c.properties, vec!["id".to_string()]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FilterConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, FilterError::Io(_)));
    }

    #[test]
    fn both_modes_write_the_same_bytes() {
        let names = NameSet::new(["id", "nested"]);
        let value = json!({"id": 1, "x": 2, "nested": {"id": 3, "y": [4]}});

        let mut streaming = Vec::new();
        FilterMode::Streaming
            .write(&mut streaming, &value, &names)
            .unwrap();
        let mut tree = Vec::new();
        FilterMode::Tree.write(&mut tree, &value, &names).unwrap();

        assert_eq!(streaming, tree);
        assert_eq!(streaming, br#"{"id":1,"nested":{"id":3}}"#);
    }

    #[test]
    fn write_tokens_leaves_the_sink_open() {
        let names = NameSet::new(["id"]);
        let mut sink = JsonWriter::new(Vec::new());
        for mode in [FilterMode::Streaming, FilterMode::Tree] {
            mode.write_tokens(&mut sink, &json!({"id": 1, "x": {"id": 2}}), &names)
                .unwrap();
        }
        sink.close().unwrap();
        assert_eq!(sink.into_inner(), b"{\"id\":1}\n{\"id\":1}");
    }
}
