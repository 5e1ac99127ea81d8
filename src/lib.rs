// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Contact Relay
//!
//! A small HTTP-facing relay that accepts web-contact-form submissions,
//! validates them, and forwards them as outbound email:
//!
//! - Cross-origin policy enforcement from a configured pattern list
//! - JSON and urlencoded body decoding
//! - Required-field and email-syntax validation
//! - Optional per-identity submission throttle with a cooldown window
//! - Redirect-based or direct-JSON responses, so the same backend serves
//!   classic form posts and script-driven submissions

pub mod body;
pub mod config;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod origin;
pub mod pipeline;
pub mod response;
pub mod validator;

pub use config::Config;
pub use pipeline::AdmissionPipeline;
pub use response::Outcome;
