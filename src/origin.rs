// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cross-origin policy enforcement.
//!
//! A request origin is allowed if any configured pattern finds a match in
//! it. Matches are unanchored searches, so a pattern like `site\.example`
//! admits `https://site.example` without the pattern spelling out the
//! scheme. Allowed responses carry the wildcard `Access-Control-Allow-Origin`
//! header, never the reflected origin.

use crate::config::{Config, ConfigError};
use regex::Regex;
use tracing::debug;

/// Origin string used when the request carries no `Origin` header.
/// A catch-all pattern still matches it.
const UNKNOWN_ORIGIN: &str = "Unknown";

/// Evaluates request origins against the configured allow-list.
pub struct OriginGuard {
    patterns: Vec<Regex>,
}

impl OriginGuard {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.origin_patterns()?))
    }

    /// Whether the given origin is permitted. An absent header is treated
    /// as the literal string `"Unknown"`.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        let origin = origin.unwrap_or(UNKNOWN_ORIGIN);
        let allowed = self.patterns.iter().any(|pattern| pattern.is_match(origin));
        if !allowed {
            debug!(origin, "origin not in allow-list");
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(patterns: &[&str]) -> OriginGuard {
        OriginGuard::new(patterns.iter().map(|p| Regex::new(p).unwrap()).collect())
    }

    #[test]
    fn catch_all_admits_anything() {
        let guard = guard(&[".*"]);
        assert!(guard.is_allowed(Some("https://site.example")));
        assert!(guard.is_allowed(Some("")));
        assert!(guard.is_allowed(None));
    }

    #[test]
    fn partial_match_admits() {
        let guard = guard(&[r"site\.example"]);
        assert!(guard.is_allowed(Some("https://site.example")));
        assert!(guard.is_allowed(Some("https://site.example:8443")));
    }

    #[test]
    fn no_match_refuses() {
        let guard = guard(&[r"site\.example"]);
        assert!(!guard.is_allowed(Some("https://evil.example")));
        assert!(!guard.is_allowed(None));
    }

    #[test]
    fn absent_origin_can_match_explicitly() {
        let guard = guard(&["Unknown"]);
        assert!(guard.is_allowed(None));
        assert!(!guard.is_allowed(Some("https://site.example")));
    }

    #[test]
    fn any_of_several_patterns_suffices() {
        let guard = guard(&[r"alpha\.example", r"beta\.example"]);
        assert!(guard.is_allowed(Some("https://beta.example")));
    }
}
