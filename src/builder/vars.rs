//! Placeholder expansion.
//!
//! Paths and flags in target descriptions may contain `{name}` tokens, which
//! are replaced with values from a [`Bindings`] map before anything is
//! emitted. Expansion is total: a token without a binding is an error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::builder::errors::GenerationError;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid token regex"));

/// Name to value map used to resolve placeholder tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    vars: BTreeMap<String, String>,
}

impl Bindings {
    /// Create an empty binding map.
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder-style [`Bindings::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Copy every binding from `other`, which takes precedence.
    pub fn extend(&mut self, other: &Bindings) {
        for (name, value) in &other.vars {
            self.vars.insert(name.clone(), value.clone());
        }
    }

    /// Iterate over bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Expand a single template.
    pub fn expand(&self, template: &str) -> Result<String, GenerationError> {
        expand(template, self)
    }

    /// Expand every template in a list, preserving order.
    pub fn expand_all<S: AsRef<str>>(&self, templates: &[S]) -> Result<Vec<String>, GenerationError> {
        expand_all(templates, self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Bindings {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Replace every `{name}` token in `template` with its binding.
///
/// Braces that do not enclose an identifier (`{}`, `{a b}`) are left alone.
pub fn expand(template: &str, bindings: &Bindings) -> Result<String, GenerationError> {
    // Find the first unbound token up front so the error names it.
    if let Some(caps) = TOKEN
        .captures_iter(template)
        .find(|caps| bindings.get(&caps[1]).is_none())
    {
        return Err(GenerationError::UnresolvedVariable {
            token: caps[1].to_string(),
            template: template.to_string(),
        });
    }

    let expanded = TOKEN.replace_all(template, |caps: &Captures| {
        bindings.get(&caps[1]).unwrap_or_default().to_string()
    });
    Ok(expanded.into_owned())
}

/// Expand every template in a list, preserving order.
pub fn expand_all<S: AsRef<str>>(
    templates: &[S],
    bindings: &Bindings,
) -> Result<Vec<String>, GenerationError> {
    templates
        .iter()
        .map(|t| expand(t.as_ref(), bindings))
        .collect()
}
