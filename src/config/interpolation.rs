//! Variable interpolation for component paths and file contents.
//!
//! Stencil substitutes `{{variable}}` placeholders from a flat mapping of
//! names to scalar values.
//!
//! # Syntax
//!
//! - `{{name}}` or `{{ name }}` - replaced with the value bound to `name`
//! - names consist of `[A-Za-z0-9_-]`; spaces and tabs around the name are
//!   allowed, a newline inside the braces leaves the text untouched
//!
//! There is no escaping, nesting, or conditional syntax.
//!
//! # Example
//!
//! ```yaml
//! dst: "src/components/{{name}}.tsx"
//! # With name="Button", produces: src/components/Button.tsx
//! ```

use crate::error::{Result, StencilError};
use regex::Regex;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Variable bindings, as they appear under `variables:` in config files.
pub type Variables = BTreeMap<String, Value>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[ \t]*([a-zA-Z0-9_-]+)[ \t]*\}\}").unwrap());

/// Extract all variable names from a template string.
///
/// Names are returned in order of first occurrence, without duplicates.
pub fn find_variables(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(input)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Check if a string contains any placeholder.
pub fn has_interpolation(input: &str) -> bool {
    PLACEHOLDER.is_match(input)
}

/// Render a bound value as text.
///
/// Strings are used verbatim, numbers and booleans use their display form,
/// null renders as an empty string and collections as compact YAML.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Tagged(tagged) => value_to_string(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Resolve all placeholders in a template string.
///
/// Every placeholder is checked before anything is substituted, so a missing
/// binding never produces partial output. Text without placeholders is
/// returned unchanged.
///
/// # Errors
///
/// Returns `UndefinedVariable` naming the first placeholder without a binding.
pub fn resolve_string(input: &str, variables: &Variables) -> Result<String> {
    if let Some(missing) = find_variables(input)
        .into_iter()
        .find(|name| !variables.contains_key(name))
    {
        return Err(StencilError::UndefinedVariable { name: missing });
    }

    let resolved = PLACEHOLDER.replace_all(input, |caps: &regex::Captures<'_>| {
        variables
            .get(&caps[1])
            .map(value_to_string)
            .unwrap_or_default()
    });

    Ok(resolved.into_owned())
}
