//! # Records
//!
//! One element of the list a command execution returns.
//!
//! Commands run in tagged mode return field/value mappings; spec-style
//! commands run with `-o` return a single mapping; commands such as `print`
//! interleave plain text or binary chunks with their mappings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single command result element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Record {
    /// Flat field -> value mapping.
    Spec(BTreeMap<String, String>),
    /// Ordered field/value pairs, as emitted by tagged output.
    Tagged(Vec<(String, String)>),
    /// Plain text output.
    Text(String),
    /// Raw bytes (e.g. binary file content from `print`).
    Binary(Vec<u8>),
}

impl Record {
    /// Build a mapping record from field/value pairs.
    pub fn spec<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Spec(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a text record.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whether this record is mapping-shaped or tagged.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Spec(_) | Self::Tagged(_))
    }

    /// Read one named field. Always `None` for text and binary records.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Self::Spec(map) => map.get(name).map(String::as_str),
            Self::Tagged(pairs) => pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Self::Text(_) | Self::Binary(_) => None,
        }
    }

    /// Text content, if this is a text record.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<BTreeMap<String, String>> for Record {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Spec(map)
    }
}
