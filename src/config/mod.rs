//! Configuration & factory.
//!
//! Parses a hierarchical cache-config tree (already materialized as
//! [`ConfigElement`] — file I/O and XML parsing are out of scope) into
//! resolved scheme elements keyed by cache name.

pub mod element;
pub mod macros;
pub mod mapping;
pub mod resolver;
pub mod scheme;

pub use element::ConfigElement;
pub use macros::MacroContext;
pub use mapping::{CacheMapping, MappingTable, MatchedMapping};
pub use resolver::ConfigResolver;
pub use scheme::{SchemeDef, SchemeKind};

use crate::error::ConfigError;

/// A fully-parsed `<cache-config>` document: the mapping table plus the
/// scheme registry needed to resolve any cache name it names.
pub struct CacheConfig {
    pub mapping: MappingTable,
    pub resolver: ConfigResolver,
}

impl CacheConfig {
    pub fn new(mapping: MappingTable, resolver: ConfigResolver) -> Self {
        Self { mapping, resolver }
    }

    /// Resolve a cache name all the way to a concrete, macro-substituted
    /// scheme element, combining `FindSchemeMapping` and `ResolveScheme`.
    ///
    /// # Errors
    /// Propagates [`ConfigError`] from either step.
    pub fn resolve_cache(&self, cache_name: &str) -> Result<(MatchedMapping, ConfigElement), ConfigError> {
        let matched = self.mapping.find(cache_name)?;
        let mut attributes = self.mapping.init_params_for(&matched.scheme_name);
        attributes.insert("scheme-ref".to_string(), matched.scheme_name.clone());
        let ctx = MacroContext { cache_name: cache_name.to_string(), suffix: matched.suffix.clone(), attributes };

        let scheme_element = self
            .resolver
            .scheme_by_name(&matched.scheme_name)
            .ok_or_else(|| ConfigError::UnknownScheme(matched.scheme_name.clone()))?
            .clone();

        let resolved = self.resolver.resolve_scheme(&scheme_element, &ctx, None)?;
        Ok((matched, resolved))
    }
}
