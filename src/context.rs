//! Operational context.
//!
//! Immutable, eagerly-parsed process identity and the registries leaf
//! schemes are instantiated from. Concrete filter-factory/serializer-
//! factory/address-provider-factory implementations are out of scope; this
//! crate only owns the registry shape and the default marker entries that
//! must be present.

use std::collections::BTreeMap;

/// A small, closed set of product editions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductEdition {
    CommunityEdition,
    StandardEdition,
    EnterpriseEdition,
    GridEdition,
}

/// Local member identity: cluster/site/rack/machine/process/member/role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberIdentity {
    pub cluster_name: String,
    pub site_name: Option<String>,
    pub rack_name: Option<String>,
    pub machine_name: String,
    pub process_name: Option<String>,
    pub member_name: Option<String>,
    pub role_name: Option<String>,
}

impl MemberIdentity {
    /// Build an identity using hostname/current-user-derived defaults, the
    /// way describes: "host-name derived defaults and
    /// current-user-derived cluster-name fallback".
    #[must_use]
    pub fn with_defaults() -> Self {
        let machine_name = hostname_fallback();
        let cluster_name = current_user_fallback();
        Self {
            cluster_name,
            site_name: None,
            rack_name: None,
            machine_name,
            process_name: None,
            member_name: None,
            role_name: None,
        }
    }
}

fn hostname_fallback() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn current_user_fallback() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .map(|user| format!("cluster-{user}"))
        .unwrap_or_else(|_| "cluster-default".to_string())
}

/// A named, inert marker for a factory this crate does not implement the
/// concrete behavior of (filter/serializer/address-provider factories are
/// out of scope; their registration shape and required defaults are not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryMarker {
    pub name: String,
}

/// A registry of named factory markers, with the standard defaults
/// pre-populated.
#[derive(Debug, Clone, Default)]
pub struct FactoryRegistry {
    entries: BTreeMap<String, FactoryMarker>,
}

impl FactoryRegistry {
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.entries.insert(name.clone(), FactoryMarker { name });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Logging parameters surfaced by the operational config.
#[derive(Debug, Clone)]
pub struct LoggingParams {
    pub level: tracing::Level,
    pub character_limit: Option<usize>,
}

impl Default for LoggingParams {
    fn default() -> Self {
        Self { level: tracing::Level::INFO, character_limit: None }
    }
}

/// The fully-parsed `<coherence>` operational configuration.
#[derive(Debug, Clone)]
pub struct OperationalContext {
    pub edition: ProductEdition,
    pub identity: MemberIdentity,
    pub filter_factories: FilterFactoryRegistry,
    pub serializer_factories: SerializerFactoryRegistry,
    pub address_provider_factories: FactoryRegistry,
    pub principal_scoping_enabled: bool,
    pub logging: LoggingParams,
}

/// Marker wrapper so the "must include gzip" invariant reads naturally at
/// call sites while staying a thin alias over [`FactoryRegistry`].
#[derive(Debug, Clone, Default)]
pub struct FilterFactoryRegistry(FactoryRegistry);

impl FilterFactoryRegistry {
    pub fn with_defaults() -> Self {
        let mut registry = FactoryRegistry::default();
        registry.register("gzip");
        Self(registry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.0.register(name);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SerializerFactoryRegistry(FactoryRegistry);

impl SerializerFactoryRegistry {
    pub fn with_defaults() -> Self {
        let mut registry = FactoryRegistry::default();
        registry.register("pof");
        Self(registry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.0.register(name);
    }
}

impl Default for OperationalContext {
    fn default() -> Self {
        Self {
            edition: ProductEdition::CommunityEdition,
            identity: MemberIdentity::with_defaults(),
            filter_factories: FilterFactoryRegistry::with_defaults(),
            serializer_factories: SerializerFactoryRegistry::with_defaults(),
            address_provider_factories: FactoryRegistry::default(),
            principal_scoping_enabled: false,
            logging: LoggingParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_includes_gzip_and_pof() {
        let ctx = OperationalContext::default();
        assert!(ctx.filter_factories.contains("gzip"));
        assert!(ctx.serializer_factories.contains("pof"));
    }
}
