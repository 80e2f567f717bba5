//! Protected route matching
//!
//! Routes not matching any rule are open. Matching rules:
//! - a prefix ending with `*` is a plain prefix test (`/api*` matches `/api-v2`)
//! - any other prefix matches the exact path or the path followed by a `/`
//!   boundary (`/admin` matches `/admin/users` but not `/administration`)
//! - methods compare case-insensitively; no methods means every method

use http::Method;
use serde::{Deserialize, Deserializer};

const WILDCARD: char = '*';

fn default_prefix() -> String {
    "/".to_string()
}

/// Accepts a missing or null prefix as `/`
fn prefix_or_root<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let prefix: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(prefix.unwrap_or_else(default_prefix))
}

/// Accepts a missing or null list, normalizes to upper case
fn upper_case_methods<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let methods: Option<Vec<String>> = Deserialize::deserialize(deserializer)?;
    Ok(methods
        .unwrap_or_default()
        .into_iter()
        .map(|m| m.trim().to_ascii_uppercase())
        .collect())
}

/// A path prefix and the methods it protects (empty = all methods)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtectedRule {
    #[serde(default = "default_prefix", deserialize_with = "prefix_or_root")]
    pub prefix: String,
    #[serde(default, deserialize_with = "upper_case_methods")]
    pub methods: Vec<String>,
}

impl ProtectedRule {
    pub fn new(prefix: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            prefix: prefix.into(),
            methods: methods.iter().map(|m| m.to_ascii_uppercase()).collect(),
        }
    }

    pub fn matches_path(&self, path: &str) -> bool {
        if let Some(base) = self.prefix.strip_suffix(WILDCARD) {
            return path.starts_with(base);
        }
        let base = self.prefix.as_str();
        if path == base {
            return true;
        }
        if base.ends_with('/') {
            path.starts_with(base)
        } else {
            path.strip_prefix(base)
                .is_some_and(|rest| rest.starts_with('/'))
        }
    }

    pub fn matches_method(&self, method: &Method) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method.as_str()))
    }
}

/// Ordered list of protection rules
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    rules: Vec<ProtectedRule>,
}

impl RouteMatcher {
    pub fn new(rules: Vec<ProtectedRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ProtectedRule] {
        &self.rules
    }

    /// First rule, in declaration order, matching both path and method
    ///
    /// A rule whose path matches but whose methods do not is skipped and the
    /// scan continues with the next rule.
    pub fn matching_rule(&self, path: &str, method: &Method) -> Option<&ProtectedRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches_path(path) && rule.matches_method(method))
    }

    pub fn is_protected(&self, path: &str, method: &Method) -> bool {
        self.matching_rule(path, method).is_some()
    }
}
