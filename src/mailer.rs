// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Outbound mail composition and delivery.
//!
//! The pipeline only sees the [`Mailer`] trait; production uses
//! [`SmtpMailer`] over lettre, tests use [`MockMailer`].

use crate::body::FormData;
use crate::config::{Config, DeliveryMode, SmtpConfig};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

/// Errors from composing or delivering a message. Never shown to the
/// submitter; the pipeline maps them all to "Could not send".
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailbox {address:?}: {source}")]
    Mailbox {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("delivery refused: {0}")]
    Refused(String),
}

/// A composed message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Narrow delivery interface the pipeline hands validated submissions to.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: MailMessage) -> Result<(), MailError>;
}

/// Assemble a [`MailMessage`] from a validated submission.
///
/// The subject is the `subject` field when present, else
/// `Contact from {name}`; either way `{field}` placeholders are
/// substituted from the submission. The body is the configured template
/// with `{content}` receiving the labeled, HTML-escaped content fields.
pub fn compose(config: &Config, data: &FormData) -> MailMessage {
    let content = config
        .fields
        .iter()
        .filter_map(|(key, label)| {
            data.get(key)
                .map(|value| format!("{label}: \n{}", escape_html(value)))
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let subject = data.get("subject").cloned().unwrap_or_else(|| {
        format!(
            "Contact from {}",
            data.get("name").map(String::as_str).unwrap_or_default()
        )
    });
    let subject = substitute(&subject, data);

    let mut vars = data.clone();
    vars.insert("content".to_string(), content);
    let body = substitute(&config.message_template, &vars);

    MailMessage {
        from: config.smtp.sender.clone(),
        to: config.smtp.recipient.clone(),
        reply_to: data.get("email").cloned(),
        subject,
        body,
    }
}

/// Replace `{key}` placeholders with submission values. Unknown
/// placeholders are left as-is.
fn substitute(template: &str, vars: &FormData) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Minimal HTML entity escape for submitter-controlled values.
fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Delivers messages over an authenticated, encrypted SMTP session.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = match config.delivery {
            DeliveryMode::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            DeliveryMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: MailMessage) -> Result<(), MailError> {
        let from = parse_mailbox(&mail.from)?;
        let to = parse_mailbox(&mail.to)?;
        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = mail.reply_to.as_deref() {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }
        let message = builder.body(mail.body)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Mailbox {
        address: address.to_string(),
        source,
    })
}

/// Recording mailer for tests.
#[derive(Default)]
pub struct MockMailer {
    sent: tokio::sync::Mutex<Vec<MailMessage>>,
    should_fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Default::default(),
            should_fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: MailMessage) -> Result<(), MailError> {
        if self.should_fail {
            return Err(MailError::Refused("mock delivery failure".to_string()));
        }
        self.sent.lock().await.push(mail);
        Ok(())
    }
}
