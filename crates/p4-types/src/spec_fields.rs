//! # Spec-Field Table
//!
//! Static knowledge of listable commands: for `clients`, the per-item spec
//! command is `client` and each summary record is keyed by its `client`
//! field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How to enumerate and key the records of one listable command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFields {
    /// Singular spec command used to fetch one record (`client`).
    pub list_field: String,
    /// Field of a summary record holding its identifying key.
    pub key_field: String,
}

impl SpecFields {
    pub fn new(list_field: impl Into<String>, key_field: impl Into<String>) -> Self {
        Self {
            list_field: list_field.into(),
            key_field: key_field.into(),
        }
    }
}

/// Listable command -> `SpecFields`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFieldTable {
    entries: HashMap<String, SpecFields>,
}

impl SpecFieldTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table a stock client ships with.
    #[must_use]
    pub fn standard() -> Self {
        [
            ("clients", "client", "client"),
            ("labels", "label", "label"),
            ("branches", "branch", "branch"),
            ("changes", "change", "change"),
            ("streams", "stream", "Stream"),
            ("jobs", "job", "Job"),
            ("users", "user", "User"),
            ("groups", "group", "group"),
            ("depots", "depot", "name"),
            ("servers", "server", "Name"),
            ("ldaps", "ldap", "Name"),
            ("remotes", "remote", "RemoteID"),
            ("repos", "repo", "Repo"),
        ]
        .into_iter()
        .fold(Self::new(), |table, (cmd, list, key)| {
            table.with(cmd, SpecFields::new(list, key))
        })
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, command: impl Into<String>, fields: SpecFields) -> Self {
        self.entries.insert(command.into(), fields);
        self
    }

    /// Look up the spec fields of a listable command.
    #[must_use]
    pub fn get(&self, command: &str) -> Option<&SpecFields> {
        self.entries.get(command)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
