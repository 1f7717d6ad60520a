//! The generic configuration element: a tagged tree with name/attributes/
//! children/value — configuration as data, not code.
//! Parsing XML (or any file format) into this tree is out of scope for this
//! crate — callers hand us an already-built tree, or we round-trip one
//! through `serde_json` in tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigElement {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ConfigElement>,
    #[serde(default)]
    pub value: Option<String>,
}

impl ConfigElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: BTreeMap::new(), children: Vec::new(), value: None }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ConfigElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, name: &str) -> Option<&ConfigElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// Replace a child with the same name, or append if none exists.
    pub fn set_child(&mut self, child: ConfigElement) {
        if let Some(slot) = self.children.iter_mut().find(|c| c.name == child.name) {
            *slot = child;
        } else {
            self.children.push(child);
        }
    }
}
