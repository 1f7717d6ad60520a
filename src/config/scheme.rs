//! Scheme tree types.

use serde::{Deserialize, Serialize};

use super::element::ConfigElement;

/// The kind of a scheme element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    Local,
    Class,
    Near,
    RemoteCache,
    RemoteInvocation,
    View,
    Unknown,
}

impl SchemeKind {
    /// Translate a configuration scheme-type name to its kind
    /// (`TranslateSchemeType`, ).
    #[must_use]
    pub fn translate(name: &str) -> Self {
        match name {
            "local-scheme" => Self::Local,
            "class-scheme" => Self::Class,
            "near-scheme" => Self::Near,
            "remote-cache-scheme" => Self::RemoteCache,
            "remote-invocation-scheme" => Self::RemoteInvocation,
            "view-scheme" => Self::View,
            _ => Self::Unknown,
        }
    }
}

/// A single named scheme definition: kind, name, optional ref to a base
/// scheme, optional service-name, and the rest of its body as a generic
/// element (so leaf-kind-specific fields round-trip without this crate
/// needing to know every leaf shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeDef {
    pub kind: SchemeKind,
    pub scheme_name: String,
    pub scheme_ref: Option<String>,
    pub service_name: Option<String>,
    pub body: ConfigElement,
}

impl SchemeDef {
    pub fn from_element(element: &ConfigElement) -> Self {
        let kind = SchemeKind::translate(&element.name);
        let scheme_name = element
            .child("scheme-name")
            .map(|c| c.text().to_string())
            .unwrap_or_default();
        let scheme_ref = element.child("scheme-ref").map(|c| c.text().to_string());
        let service_name = element.child("service-name").map(|c| c.text().to_string());
        Self { kind, scheme_name, scheme_ref, service_name, body: element.clone() }
    }
}
