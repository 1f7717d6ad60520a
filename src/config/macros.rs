//! Macro substitution.
//!
//! Two independent substitution passes apply to every resolved element's
//! text content:
//! 1. cache-name macros — `{cache-name}` (the matched mapping's suffix) and
//!    `{scheme-ref}` (an attribute carried alongside the mapping); the
//!    literal `{manager-context}` is reserved and left untouched here (it is
//!    substituted by the operational context, out of scope for this module).
//! 2. environment substitution — a `system-property="NAME"` attribute on an
//!    element replaces its value outright, and inline `${NAME default}`
//!    tokens are replaced by the environment value or the space-separated
//!    default.

use std::collections::BTreeMap;

use crate::config::element::ConfigElement;
use crate::error::ConfigError;

/// Per-instantiation substitution context: what `{cache-name}` and friends
/// resolve to for one `resolve_scheme` call.
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
    pub cache_name: String,
    pub suffix: String,
    pub attributes: BTreeMap<String, String>,
}

const RESERVED_MANAGER_CONTEXT: &str = "{manager-context}";

/// Apply macro + environment substitution to every text value in the tree,
/// returning a new tree. Fails closed: an unresolved macro halts
/// construction rather than silently leaving the placeholder in place.
pub fn substitute(element: &ConfigElement, ctx: &MacroContext) -> Result<ConfigElement, ConfigError> {
    let mut out = element.clone();

    if let Some(system_property) = out.attributes.get("system-property").cloned() {
        if let Ok(value) = std::env::var(&system_property) {
            out.value = Some(value);
        }
    }

    if let Some(value) = &out.value {
        out.value = Some(substitute_text(value, ctx)?);
    }

    for child in &mut out.children {
        *child = substitute(child, ctx)?;
    }

    Ok(out)
}

fn substitute_text(text: &str, ctx: &MacroContext) -> Result<String, ConfigError> {
    let text = substitute_env_tokens(text);
    let text = text.replace("{cache-name}", &ctx.suffix);

    let mut result = text;
    if result.contains(RESERVED_MANAGER_CONTEXT) {
        // Left for the operational context to resolve; not an error here.
        let placeholder = "\u{0}RESERVED_MANAGER_CONTEXT\u{0}";
        result = result.replace(RESERVED_MANAGER_CONTEXT, placeholder);
        result = substitute_named_macros(&result, ctx)?;
        result = result.replace(placeholder, RESERVED_MANAGER_CONTEXT);
    } else {
        result = substitute_named_macros(&result, ctx)?;
    }

    if result.contains('{') && result.contains('}') && still_has_unresolved_macro(&result) {
        return Err(ConfigError::UnresolvedMacro(result));
    }

    Ok(result)
}

fn substitute_named_macros(text: &str, ctx: &MacroContext) -> Result<String, ConfigError> {
    let mut result = text.to_string();
    for (key, value) in &ctx.attributes {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    Ok(result)
}

fn still_has_unresolved_macro(text: &str) -> bool {
    // A remaining `{...}` pair that isn't the reserved token is unresolved.
    text.find('{').is_some_and(|start| text[start + 1..].contains('}'))
}

/// Replace `${NAME default}` tokens with the environment value of `NAME`,
/// or the space-separated default when the variable is unset.
fn substitute_env_tokens(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let token = &after[..end];
        let mut parts = token.splitn(2, ' ');
        let name = parts.next().unwrap_or("");
        let default = parts.next().unwrap_or("");
        let value = std::env::var(name).unwrap_or_else(|_| default.to_string());
        result.push_str(&value);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    result
}
