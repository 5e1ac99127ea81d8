// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request-body decoding.
//!
//! Turns a raw body plus declared content type into a flat string map.
//! Malformed bodies are deliberately lenient: decode failures are logged
//! and degrade to an empty map, which downstream validation then rejects
//! as an empty message.

use std::collections::HashMap;
use tracing::debug;

/// Decoded form fields, keyed by whatever names the client sent.
pub type FormData = HashMap<String, String>;

/// Decode a request body according to its declared content type.
///
/// Supports `application/json` (object of fields) and
/// `application/x-www-form-urlencoded`. Any other or absent content type
/// yields an empty map. Never fails.
pub fn decode(content_type: Option<&str>, body: &str) -> FormData {
    let content_type = content_type.unwrap_or("");
    if content_type.contains("application/json") {
        decode_json(body).unwrap_or_else(|| {
            debug!("discarding unparseable JSON body");
            FormData::new()
        })
    } else if content_type.contains("application/x-www-form-urlencoded") {
        decode_form(body).unwrap_or_else(|| {
            debug!("discarding malformed urlencoded body");
            FormData::new()
        })
    } else {
        FormData::new()
    }
}

fn decode_json(body: &str) -> Option<FormData> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body).ok()?;
    Some(
        object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
    )
}

fn decode_form(body: &str) -> Option<FormData> {
    let mut data = FormData::new();
    for segment in body.split('&') {
        // A segment without `=` fails the whole decode.
        let (key, value) = segment.split_once('=')?;
        let value = urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned();
        data.insert(key.to_string(), value);
    }
    Some(data)
}
