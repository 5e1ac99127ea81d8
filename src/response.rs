// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Outcome rendering.
//!
//! The same backend serves classic form posts and script-driven
//! submissions. When a request arrives with an `Origin` header and both
//! `success` and `failure` redirect targets, the outcome is rendered as a
//! 303 redirect back to the originating site; otherwise it is returned
//! directly as JSON.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::debug;

/// Result of processing one submission: an HTTP status and a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    code: StatusCode,
    message: String,
}

impl Outcome {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK, "OK")
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// An outcome is successful iff its code is in [200,400). This drives
    /// which redirect target is chosen.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.code.as_u16())
    }

    /// The JSON body shape shared by direct responses and the redirect
    /// `reason` parameter.
    pub fn body_json(&self) -> String {
        serde_json::json!({ "status": self.message }).to_string()
    }
}

/// Render an outcome for the request that produced it.
///
/// Redirect mode requires an `Origin` header and both redirect targets;
/// anything less falls back to a direct JSON response.
pub fn dispatch(
    origin: Option<&str>,
    success: Option<&str>,
    failure: Option<&str>,
    outcome: &Outcome,
) -> Response {
    if let Some(origin) = origin {
        if let (Some(success), Some(failure)) = (success, failure) {
            return redirect(origin, success, failure, outcome);
        }
        debug!("success or failure redirect target undefined, responding directly");
    }
    direct(outcome)
}

fn redirect(origin: &str, success: &str, failure: &str, outcome: &Outcome) -> Response {
    let location = if outcome.is_success() {
        format!("{origin}{success}")
    } else {
        let reason = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("reason", &outcome.body_json())
            .finish();
        format!("{origin}{failure}?{reason}")
    };
    (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
}

fn direct(outcome: &Outcome) -> Response {
    (
        outcome.code(),
        [(header::CONTENT_TYPE, "application/json")],
        outcome.body_json(),
    )
        .into_response()
}
