// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the contact relay.
//!
//! One immutable [`Config`] value is constructed at startup (from a TOML
//! file) and passed explicitly into each component constructor. Origin
//! patterns are compiled during loading so that a bad pattern fails the
//! process before it starts listening.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid origin pattern {pattern:?}: {source}")]
    InvalidOriginPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Outbound mail settings
    pub smtp: SmtpConfig,

    /// Allowed origin patterns. A request origin is allowed if any pattern
    /// finds a match in it (partial search, not anchored).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Content field key -> label used when laying out the mail body.
    /// At least one of these fields must be filled for a submission to
    /// count as non-empty.
    #[serde(default = "default_fields")]
    pub fields: BTreeMap<String, String>,

    /// Mail body template. `{content}` receives the labeled content fields;
    /// any `{field}` placeholder is substituted from the submission.
    #[serde(default = "default_message_template")]
    pub message_template: String,

    /// Per-identity submission throttle. Absent means no rate limiting.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// Honeypot field name. When set, submissions must carry this field
    /// empty; a missing or filled field is silently dropped.
    #[serde(default)]
    pub spam_filter_field: Option<String>,
}

/// SMTP transport settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// Session establishment mode
    #[serde(default)]
    pub delivery: DeliveryMode,

    /// Relay host
    pub host: String,

    /// Relay port (default: 587)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Address the relay authenticates and sends as
    pub sender: String,

    /// Password for the sender account
    pub password: String,

    /// Address submissions are forwarded to
    pub recipient: String,
}

/// How the SMTP session is encrypted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Plain connection upgraded via STARTTLS
    #[default]
    Starttls,
    /// Implicit TLS from the first byte
    Tls,
}

/// Submission throttle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Cooldown window in seconds (default: 300)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Where the client identity key comes from
    #[serde(default)]
    pub identity_source: IdentitySource,
}

/// Source of the identity key the throttle is keyed by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    /// The peer address as seen by the listener
    #[default]
    Default,
    /// The literal value of a named request header
    Header(String),
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![".*".to_string()]
}

fn default_fields() -> BTreeMap<String, String> {
    BTreeMap::from([("message".to_string(), "Message".to_string())])
}

fn default_message_template() -> String {
    "A new contact message from {name} has been received:\n\n{content}\n".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_window_secs() -> u64 {
    300
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&raw)?;
        // Surface bad patterns now rather than on the first request.
        config.origin_patterns()?;
        Ok(config)
    }

    /// Compile the allowed-origin patterns.
    pub fn origin_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.allowed_origins
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidOriginPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

impl RateLimitConfig {
    /// Get the cooldown window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}
