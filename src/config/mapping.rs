//! Cache-name-pattern → scheme mapping.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// A single mapping entry: a pattern and the scheme it resolves to.
#[derive(Debug, Clone)]
pub struct CacheMapping {
    pub pattern: String,
    pub scheme_name: String,
    pub init_params: BTreeMap<String, String>,
}

/// The result of matching a cache name against the mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedMapping {
    pub scheme_name: String,
    /// What replaced `*` in a wildcard pattern; the cache name itself for
    /// an exact match.
    pub suffix: String,
}

/// Validate that a pattern is either exact, `*`, or has exactly one `*` as
/// its final character.
pub fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    let star_count = pattern.matches('*').count();
    match star_count {
        0 => Ok(()),
        1 if pattern.ends_with('*') => Ok(()),
        _ => Err(ConfigError::InvalidWildcard(pattern.to_string())),
    }
}

/// Ordered table of mappings; resolution precedence is exact > longest
/// prefix > default `*`, with first-encountered-in-insertion-order
/// breaking ties among equal-length prefixes.
pub struct MappingTable {
    entries: Vec<CacheMapping>,
}

impl MappingTable {
    /// # Errors
    /// Returns [`ConfigError::InvalidWildcard`] if any entry's pattern is malformed.
    pub fn new(entries: Vec<CacheMapping>) -> Result<Self, ConfigError> {
        for entry in &entries {
            validate_pattern(&entry.pattern)?;
        }
        Ok(Self { entries })
    }

    /// `FindSchemeMapping`.
    ///
    /// # Errors
    /// Returns [`ConfigError::NoMapping`] if no pattern matches `cache_name`.
    pub fn find(&self, cache_name: &str) -> Result<MatchedMapping, ConfigError> {
        if let Some(exact) = self.entries.iter().find(|e| e.pattern == cache_name) {
            return Ok(MatchedMapping { scheme_name: exact.scheme_name.clone(), suffix: cache_name.to_string() });
        }

        let mut best: Option<(&CacheMapping, usize)> = None;
        for entry in &self.entries {
            if entry.pattern == "*" {
                continue;
            }
            let Some(prefix) = entry.pattern.strip_suffix('*') else { continue };
            if cache_name.starts_with(prefix) {
                let len = prefix.len();
                if best.map(|(_, best_len)| len > best_len).unwrap_or(true) {
                    best = Some((entry, len));
                }
            }
        }
        if let Some((entry, prefix_len)) = best {
            return Ok(MatchedMapping {
                scheme_name: entry.scheme_name.clone(),
                suffix: cache_name[prefix_len..].to_string(),
            });
        }

        if let Some(default) = self.entries.iter().find(|e| e.pattern == "*") {
            return Ok(MatchedMapping { scheme_name: default.scheme_name.clone(), suffix: cache_name.to_string() });
        }

        Err(ConfigError::NoMapping(cache_name.to_string()))
    }

    pub fn init_params_for(&self, scheme_name: &str) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .find(|e| e.scheme_name == scheme_name)
            .map(|e| e.init_params.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MappingTable {
        MappingTable::new(vec![
            CacheMapping { pattern: "orders-*".into(), scheme_name: "A".into(), init_params: BTreeMap::new() },
            CacheMapping { pattern: "*".into(), scheme_name: "B".into(), init_params: BTreeMap::new() },
        ])
        .unwrap()
    }

    #[test]
    fn wildcard_mapping_precedence() {
        let t = table();
        let m = t.find("orders-2024").unwrap();
        assert_eq!(m.scheme_name, "A");
        assert_eq!(m.suffix, "2024");

        let m = t.find("misc").unwrap();
        assert_eq!(m.scheme_name, "B");
        assert_eq!(m.suffix, "misc");
    }

    #[test]
    fn exact_beats_prefix_and_default() {
        let t = MappingTable::new(vec![
            CacheMapping { pattern: "orders-2024".into(), scheme_name: "EXACT".into(), init_params: BTreeMap::new() },
            CacheMapping { pattern: "orders-*".into(), scheme_name: "PREFIX".into(), init_params: BTreeMap::new() },
            CacheMapping { pattern: "*".into(), scheme_name: "DEFAULT".into(), init_params: BTreeMap::new() },
        ])
        .unwrap();
        assert_eq!(t.find("orders-2024").unwrap().scheme_name, "EXACT");
    }

    #[test]
    fn longest_prefix_wins_ties_first_encountered() {
        let t = MappingTable::new(vec![
            CacheMapping { pattern: "orders-east-*".into(), scheme_name: "LONG".into(), init_params: BTreeMap::new() },
            CacheMapping { pattern: "orders-*".into(), scheme_name: "SHORT".into(), init_params: BTreeMap::new() },
        ])
        .unwrap();
        assert_eq!(t.find("orders-east-1").unwrap().scheme_name, "LONG");
    }

    #[test]
    fn no_match_is_an_error() {
        let t = MappingTable::new(vec![CacheMapping { pattern: "orders-*".into(), scheme_name: "A".into(), init_params: BTreeMap::new() }]).unwrap();
        assert!(t.find("misc").is_err());
    }

    #[test]
    fn rejects_malformed_wildcard() {
        let err = MappingTable::new(vec![CacheMapping { pattern: "or*ders".into(), scheme_name: "A".into(), init_params: BTreeMap::new() }]);
        assert!(matches!(err, Err(ConfigError::InvalidWildcard(_))));
    }
}
