// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Submission field validation.
//!
//! Checks run in a fixed priority order so that co-occurring violations
//! always surface the same message: empty-message first, then email
//! syntax.

use crate::body::FormData;
use crate::response::Outcome;
use axum::http::StatusCode;
use regex::Regex;

/// RFC-5322-subset address grammar: dot-atom local part, `@`,
/// dot-separated domain labels. Anchored at the start only; trailing
/// content after a valid address is tolerated.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?";

/// Validates decoded submissions against the required-field and
/// content-field rules.
pub struct FormValidator {
    email_pattern: Regex,
    content_fields: Vec<String>,
}

impl FormValidator {
    pub fn new(content_fields: Vec<String>) -> Self {
        Self {
            email_pattern: Regex::new(EMAIL_PATTERN).expect("email pattern compiles"),
            content_fields,
        }
    }

    /// Check a submission. `None` means valid; otherwise the first
    /// applicable failure in priority order.
    pub fn validate(&self, data: &FormData) -> Option<Outcome> {
        let name = data.get("name").map(String::as_str).unwrap_or("");
        let email = data.get("email").map(String::as_str).unwrap_or("");
        let has_content = self
            .content_fields
            .iter()
            .any(|field| data.get(field).is_some_and(|value| !value.is_empty()));

        if name.is_empty() || email.is_empty() || !has_content {
            return Some(Outcome::new(
                StatusCode::BAD_REQUEST,
                "Cannot send empty message",
            ));
        }
        if !self.email_pattern.is_match(email) {
            return Some(Outcome::new(StatusCode::BAD_REQUEST, "Invalid Email"));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> FormValidator {
        FormValidator::new(vec!["message".to_string()])
    }

    fn form(entries: &[(&str, &str)]) -> FormData {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_name_is_empty_message() {
        let outcome = validator()
            .validate(&form(&[("name", ""), ("email", "a@b.com"), ("message", "hi")]))
            .unwrap();
        assert_eq!(outcome.message(), "Cannot send empty message");
        assert_eq!(outcome.code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_email_is_empty_message() {
        let outcome = validator()
            .validate(&form(&[("name", "A"), ("message", "hi")]))
            .unwrap();
        assert_eq!(outcome.message(), "Cannot send empty message");
    }

    #[test]
    fn no_content_field_is_empty_message() {
        let outcome = validator()
            .validate(&form(&[("name", "A"), ("email", "a@b.com"), ("message", "")]))
            .unwrap();
        assert_eq!(outcome.message(), "Cannot send empty message");
    }

    #[test]
    fn bad_email_syntax() {
        let outcome = validator()
            .validate(&form(&[
                ("name", "A"),
                ("email", "not-an-email"),
                ("message", "hi"),
            ]))
            .unwrap();
        assert_eq!(outcome.message(), "Invalid Email");
    }

    #[test]
    fn empty_message_takes_priority_over_bad_email() {
        let outcome = validator()
            .validate(&form(&[("name", ""), ("email", "not-an-email"), ("message", "hi")]))
            .unwrap();
        assert_eq!(outcome.message(), "Cannot send empty message");
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validator()
            .validate(&form(&[("name", "A"), ("email", "a@b.com"), ("message", "hi")]))
            .is_none());
    }

    #[test]
    fn any_configured_content_field_counts() {
        let validator = FormValidator::new(vec!["message".to_string(), "phone".to_string()]);
        assert!(validator
            .validate(&form(&[
                ("name", "A"),
                ("email", "a@b.com"),
                ("phone", "555-0100"),
            ]))
            .is_none());
    }

    #[test]
    fn email_grammar_accepts_subdomains_and_tags() {
        let v = validator();
        for email in ["a.b+tag@mail.example.co.uk", "x_y@sub.domain.example"] {
            assert!(
                v.validate(&form(&[("name", "A"), ("email", email), ("message", "hi")]))
                    .is_none(),
                "{email} should be accepted"
            );
        }
    }

    #[test]
    fn email_grammar_rejects_bad_domains() {
        let v = validator();
        for email in ["a@", "@b.com", "a@nodot", "a@-bad.com"] {
            assert!(
                v.validate(&form(&[("name", "A"), ("email", email), ("message", "hi")]))
                    .is_some(),
                "{email} should be rejected"
            );
        }
    }
}
