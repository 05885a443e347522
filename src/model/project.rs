//! Project configuration: class labels and attribute schemas.
//!
//! Supplied to the engine as already-parsed data when a session is opened;
//! the engine never edits it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One configurable attribute: a name and its ordered set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute name, used as the key on every box.
    pub name: String,
    /// Allowed option strings, in display order.
    pub options: Vec<String>,
}

/// Read-only per-project annotation schema.
///
/// The first class is the default for newly drawn boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Ordered class labels.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Ordered attribute specifications.
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

impl ProjectConfig {
    /// Class assigned to a newly drawn box: the first configured class, or
    /// empty when the project has none.
    pub fn default_class(&self) -> String {
        self.classes.first().cloned().unwrap_or_default()
    }

    /// Placeholder attribute map for a new box: every configured attribute
    /// present with an empty value.
    pub fn empty_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .map(|spec| (spec.name.clone(), String::new()))
            .collect()
    }
}
