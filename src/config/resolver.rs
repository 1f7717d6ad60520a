//! `ResolveScheme` / `FindSchemeMapping` / `TranslateSchemeType`.

use std::collections::{BTreeMap, HashSet};

use crate::config::element::ConfigElement;
use crate::config::macros::{substitute, MacroContext};
use crate::config::scheme::{SchemeDef, SchemeKind};
use crate::error::ConfigError;

/// Children that may appear at most once under `near`/`view` schemes.
const SINGLETON_CHILDREN: &[&str] = &["front-scheme", "back-scheme"];

/// Resolves `scheme-ref` chains and applies macro substitution over a
/// registry of named scheme definitions (the `<caching-schemes>` body).
pub struct ConfigResolver {
    schemes: BTreeMap<String, ConfigElement>,
}

impl ConfigResolver {
    /// Build a resolver from the `<caching-schemes>` element's children.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateServiceName`] if two sibling schemes
    /// declare the same `service-name`.
    pub fn from_schemes_element(caching_schemes: &ConfigElement) -> Result<Self, ConfigError> {
        let mut schemes = BTreeMap::new();
        let mut seen_service_names = HashSet::new();

        for child in &caching_schemes.children {
            let def = SchemeDef::from_element(child);
            if let Some(service_name) = &def.service_name {
                if !seen_service_names.insert(service_name.clone()) {
                    return Err(ConfigError::DuplicateServiceName(service_name.clone()));
                }
            }
            schemes.insert(def.scheme_name.clone(), child.clone());
        }

        Ok(Self { schemes })
    }

    pub fn translate_scheme_type(name: &str) -> SchemeKind {
        SchemeKind::translate(name)
    }

    pub fn scheme_by_name(&self, name: &str) -> Option<&ConfigElement> {
        self.schemes.get(name)
    }

    /// `ResolveScheme`: clone, follow `scheme-ref` to a base, assert kinds
    /// match, detect cycles, overlay this element's children onto the
    /// resolved base (child wins), then apply macro substitution.
    ///
    /// `require_child` names a child that must appear at most once (checked
    /// against [`SINGLETON_CHILDREN`] regardless, this parameter additionally
    /// asserts its presence when `Some`).
    ///
    /// # Errors
    /// See [`ConfigError`] variants for the individual failure modes.
    pub fn resolve_scheme(
        &self,
        element: &ConfigElement,
        ctx: &MacroContext,
        require_child: Option<&str>,
    ) -> Result<ConfigElement, ConfigError> {
        let mut visited = HashSet::new();
        let merged = self.resolve_recursive(element, &mut visited)?;
        self.check_singleton_children(&merged)?;
        if let Some(name) = require_child {
            if merged.child(name).is_none() {
                return Err(ConfigError::UnknownScheme(format!("required child '{name}' missing")));
            }
        }
        substitute(&merged, ctx)
    }

    fn resolve_recursive(&self, element: &ConfigElement, visited: &mut HashSet<String>) -> Result<ConfigElement, ConfigError> {
        let def = SchemeDef::from_element(element);
        let Some(base_name) = def.scheme_ref.clone() else {
            return Ok(element.clone());
        };

        if !def.scheme_name.is_empty() && base_name == def.scheme_name {
            return Err(ConfigError::CyclicRef(base_name));
        }
        if !visited.insert(base_name.clone()) {
            return Err(ConfigError::CyclicRef(base_name));
        }

        let base_element = self
            .schemes
            .get(&base_name)
            .ok_or_else(|| ConfigError::UnknownScheme(base_name.clone()))?
            .clone();

        let base_kind = SchemeKind::translate(&base_element.name);
        let child_kind = SchemeKind::translate(&element.name);
        if base_kind != child_kind {
            return Err(ConfigError::KindMismatch {
                child: def.scheme_name.clone(),
                child_kind,
                base: base_name,
                base_kind,
            });
        }

        let resolved_base = self.resolve_recursive(&base_element, visited)?;
        visited.remove(&base_name);

        let mut merged = resolved_base;
        merged.name = element.name.clone();
        for child in &element.children {
            if child.name == "scheme-ref" {
                continue;
            }
            merged.set_child(child.clone());
        }
        Ok(merged)
    }

    fn check_singleton_children(&self, element: &ConfigElement) -> Result<(), ConfigError> {
        let kind = SchemeKind::translate(&element.name);
        if !matches!(kind, SchemeKind::Near | SchemeKind::View) {
            return Ok(());
        }
        for name in SINGLETON_CHILDREN {
            if element.children_named(name).count() > 1 {
                return Err(ConfigError::TooManyChildren(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemes(children: Vec<ConfigElement>) -> ConfigElement {
        let mut el = ConfigElement::new("caching-schemes");
        el.children = children;
        el
    }

    fn scheme(tag: &str, name: &str, ref_: Option<&str>) -> ConfigElement {
        let mut el = ConfigElement::new(tag).with_child(ConfigElement::new("scheme-name").with_value(name));
        if let Some(r) = ref_ {
            el = el.with_child(ConfigElement::new("scheme-ref").with_value(r));
        }
        el
    }

    #[test]
    fn resolves_simple_ref_chain() {
        let base = scheme("local-scheme", "base", None).with_child(ConfigElement::new("high-units").with_value("1000"));
        let child = scheme("local-scheme", "child", Some("base"));
        let resolver = ConfigResolver::from_schemes_element(&schemes(vec![base, child.clone()])).unwrap();
        let resolved = resolver.resolve_scheme(&child, &MacroContext::default(), None).unwrap();
        assert_eq!(resolved.child("high-units").unwrap().text(), "1000");
    }

    #[test]
    fn direct_self_reference_is_a_cycle() {
        let el = scheme("local-scheme", "loop", Some("loop"));
        let resolver = ConfigResolver::from_schemes_element(&schemes(vec![el.clone()])).unwrap();
        let err = resolver.resolve_scheme(&el, &MacroContext::default(), None);
        assert!(matches!(err, Err(ConfigError::CyclicRef(_))));
    }

    #[test]
    fn indirect_cycle_is_detected() {
        let a = scheme("local-scheme", "a", Some("b"));
        let b = scheme("local-scheme", "b", Some("a"));
        let resolver = ConfigResolver::from_schemes_element(&schemes(vec![a.clone(), b])).unwrap();
        let err = resolver.resolve_scheme(&a, &MacroContext::default(), None);
        assert!(matches!(err, Err(ConfigError::CyclicRef(_))));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let base = scheme("remote-cache-scheme", "base", None);
        let child = scheme("local-scheme", "child", Some("base"));
        let resolver = ConfigResolver::from_schemes_element(&schemes(vec![base, child.clone()])).unwrap();
        let err = resolver.resolve_scheme(&child, &MacroContext::default(), None);
        assert!(matches!(err, Err(ConfigError::KindMismatch { .. })));
    }

    #[test]
    fn child_overrides_base_on_conflict() {
        let base = scheme("local-scheme", "base", None).with_child(ConfigElement::new("high-units").with_value("1000"));
        let child = scheme("local-scheme", "child", Some("base")).with_child(ConfigElement::new("high-units").with_value("2000"));
        let resolver = ConfigResolver::from_schemes_element(&schemes(vec![base, child.clone()])).unwrap();
        let resolved = resolver.resolve_scheme(&child, &MacroContext::default(), None).unwrap();
        assert_eq!(resolved.child("high-units").unwrap().text(), "2000");
    }

    #[test]
    fn duplicate_service_name_rejected() {
        let mut a = scheme("remote-cache-scheme", "a", None);
        a = a.with_child(ConfigElement::new("service-name").with_value("Svc"));
        let mut b = scheme("remote-cache-scheme", "b", None);
        b = b.with_child(ConfigElement::new("service-name").with_value("Svc"));
        let err = ConfigResolver::from_schemes_element(&schemes(vec![a, b]));
        assert!(matches!(err, Err(ConfigError::DuplicateServiceName(_))));
    }

    #[test]
    fn too_many_front_schemes_under_near_is_rejected() {
        let near = scheme("near-scheme", "n", None)
            .with_child(ConfigElement::new("front-scheme"))
            .with_child(ConfigElement::new("front-scheme"));
        let resolver = ConfigResolver::from_schemes_element(&schemes(vec![near.clone()])).unwrap();
        let err = resolver.resolve_scheme(&near, &MacroContext::default(), None);
        assert!(matches!(err, Err(ConfigError::TooManyChildren(_))));
    }
}
