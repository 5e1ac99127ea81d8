// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request-admission pipeline.
//!
//! For one submission: origin check, then the optional throttle, then
//! body decoding and field validation, then delivery. Each stage either
//! passes the request on or stops it with an [`Outcome`]. The throttle is
//! a stage that is present or absent by configuration, not a separate
//! handler type.

use crate::body::{self, FormData};
use crate::config::{Config, ConfigError};
use crate::limiter::RateLimiter;
use crate::mailer::{self, Mailer};
use crate::origin::OriginGuard;
use crate::response::Outcome;
use crate::validator::FormValidator;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

pub struct AdmissionPipeline {
    origin_guard: OriginGuard,
    limiter: Option<RateLimiter>,
    validator: FormValidator,
    mailer: Arc<dyn Mailer>,
    config: Config,
}

impl AdmissionPipeline {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Result<Self, ConfigError> {
        let origin_guard = OriginGuard::from_config(&config)?;
        let limiter = config
            .rate_limit
            .as_ref()
            .map(|rate_limit| RateLimiter::new(rate_limit.window_duration()));
        let validator = FormValidator::new(config.fields.keys().cloned().collect());
        Ok(Self {
            origin_guard,
            limiter,
            validator,
            mailer,
            config,
        })
    }

    /// The guard is also consulted for preflight responses and the
    /// allow-origin header, independent of submissions.
    pub fn origin_guard(&self) -> &OriginGuard {
        &self.origin_guard
    }

    /// Run one submission through the pipeline.
    pub async fn admit(
        &self,
        origin: Option<&str>,
        identity: &str,
        content_type: Option<&str>,
        raw_body: &str,
    ) -> Outcome {
        if !self.origin_guard.is_allowed(origin) {
            return Outcome::new(StatusCode::BAD_REQUEST, "Origin Check Failed");
        }

        if let Some(limiter) = &self.limiter {
            if !limiter.try_admit(identity).await {
                return Outcome::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
            }
        }

        let data = body::decode(content_type, raw_body);
        if let Some(outcome) = self.validator.validate(&data) {
            return outcome;
        }

        if self.honeypot_tripped(&data) {
            // The sender sees success; nothing is delivered.
            return Outcome::ok();
        }

        let mail = mailer::compose(&self.config, &data);
        match self.mailer.send(mail).await {
            Ok(()) => Outcome::ok(),
            Err(err) => {
                error!(error = %err, "mail delivery failed");
                Outcome::new(StatusCode::BAD_REQUEST, "Could not send")
            }
        }
    }

    /// When a honeypot field is configured it must arrive present and
    /// empty; bots that fill or omit it are dropped silently.
    fn honeypot_tripped(&self, data: &FormData) -> bool {
        let Some(field) = &self.config.spam_filter_field else {
            return false;
        };
        let tripped = !data.get(field).is_some_and(|value| value.is_empty());
        if tripped {
            info!(field = %field, "honeypot tripped, dropping submission");
        }
        tripped
    }
}
