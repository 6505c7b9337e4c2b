//! SMTP mail transport implementation using lettre

use super::markdown::markdown_to_html;
use super::provider::{MailTransport, TransportError};
use crate::domain::{DeliveryResult, OutgoingMessage, SecurityMode, SmtpCredentials};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};

/// Stateless SMTP transport. A fresh connection is opened for every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailTransport;

impl SmtpMailTransport {
    pub fn new() -> Self {
        Self
    }

    /// Transport configured for the credential's security mode
    pub fn build_transport(
        credentials: &SmtpCredentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let host = credentials.host.trim();
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host);

        builder = match credentials.security {
            SecurityMode::None => builder.tls(Tls::None),
            SecurityMode::Starttls => builder.tls(Tls::Required(Self::tls_parameters(host)?)),
            SecurityMode::ImplicitTls => builder.tls(Tls::Wrapper(Self::tls_parameters(host)?)),
        };

        // Socket backstop; the exchange deadline in `run` is authoritative
        let socket_timeout = credentials.timeout + Duration::from_secs(1);

        Ok(builder
            .port(credentials.port)
            .credentials(Credentials::new(
                credentials.sender_email.clone(),
                credentials.password.expose_secret().clone(),
            ))
            .timeout(Some(socket_timeout))
            .build())
    }

    fn tls_parameters(host: &str) -> Result<TlsParameters, TransportError> {
        TlsParameters::new(host.to_string())
            .map_err(|e| TransportError::Protocol(format!("TLS setup failed: {}", e)))
    }

    fn build_from_mailbox(credentials: &SmtpCredentials) -> Result<Mailbox, TransportError> {
        let mailbox = match credentials.sender_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                format!("{} <{}>", name, credentials.sender_email.trim())
            }
            _ => credentials.sender_email.trim().to_string(),
        };

        mailbox
            .parse()
            .map_err(|e| TransportError::InvalidMessage(format!("Invalid from address: {}", e)))
    }

    fn parse_mailbox(address: &str, field: &str) -> Result<Mailbox, TransportError> {
        address.trim().parse().map_err(|e| {
            TransportError::InvalidMessage(format!("Invalid {} address '{}': {}", field, address, e))
        })
    }

    /// MIME message for `message`. Bcc recipients go to the envelope only.
    pub fn build_message(
        credentials: &SmtpCredentials,
        message: &OutgoingMessage,
    ) -> Result<Message, TransportError> {
        if message.to.is_empty() {
            return Err(TransportError::InvalidMessage(
                "No recipients specified".to_string(),
            ));
        }

        let mut builder = Message::builder()
            .from(Self::build_from_mailbox(credentials)?)
            .subject(message.subject.as_str());

        for to in &message.to {
            builder = builder.to(Self::parse_mailbox(to, "to")?);
        }
        for cc in &message.cc {
            builder = builder.cc(Self::parse_mailbox(cc, "cc")?);
        }
        for bcc in &message.bcc {
            builder = builder.bcc(Self::parse_mailbox(bcc, "bcc")?);
        }

        let plain = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone());

        let email = if message.is_markdown {
            builder.multipart(
                MultiPart::alternative().singlepart(plain).singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(markdown_to_html(&message.body)),
                ),
            )
        } else {
            builder.singlepart(plain)
        };

        email.map_err(|e| TransportError::InvalidMessage(e.to_string()))
    }

    fn classify(error: &lettre::transport::smtp::Error) -> TransportError {
        let status = error.status().map(|code| code.to_string());
        TransportError::classify(error.is_timeout(), status.as_deref(), &error.to_string())
    }

    /// Run one SMTP exchange under the credential's deadline
    async fn run<T, F>(timeout: Duration, exchange: F) -> Result<T, TransportError>
    where
        F: std::future::Future<Output = Result<T, lettre::transport::smtp::Error>>,
    {
        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Self::classify(&e)),
            Err(_) => Err(TransportError::Timeout(format!(
                "no response within {}s",
                timeout.as_secs()
            ))),
        }
    }
}

fn elapsed_seconds(started: Instant) -> i64 {
    started.elapsed().as_secs() as i64
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn probe(&self, credentials: &SmtpCredentials) -> DeliveryResult {
        let started = Instant::now();

        let transport = match Self::build_transport(credentials) {
            Ok(transport) => transport,
            Err(e) => return e.into_result(0),
        };

        match Self::run(credentials.timeout, transport.test_connection()).await {
            Ok(true) => {
                tracing::info!(
                    host = %credentials.host,
                    port = credentials.port,
                    security = %credentials.security,
                    "SMTP connection test succeeded"
                );
                DeliveryResult::delivered("SMTP connection successful", elapsed_seconds(started))
            }
            Ok(false) => {
                tracing::warn!(host = %credentials.host, "SMTP server did not answer NOOP");
                TransportError::Protocol("server did not respond to NOOP".to_string())
                    .into_result(elapsed_seconds(started))
            }
            Err(e) => {
                tracing::warn!(
                    host = %credentials.host,
                    port = credentials.port,
                    kind = %e.kind(),
                    error = %e,
                    "SMTP connection test failed"
                );
                e.into_result(elapsed_seconds(started))
            }
        }
    }

    async fn deliver(
        &self,
        credentials: &SmtpCredentials,
        message: &OutgoingMessage,
    ) -> DeliveryResult {
        let started = Instant::now();

        let prepared = Self::build_transport(credentials)
            .and_then(|transport| Ok((transport, Self::build_message(credentials, message)?)));
        let (transport, email) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(error = %e, "Could not prepare SMTP message");
                return e.into_result(0);
            }
        };

        match Self::run(credentials.timeout, transport.send(email)).await {
            Ok(response) => {
                let count = message.recipient_count();
                tracing::info!(
                    host = %credentials.host,
                    recipients = count,
                    code = %response.code(),
                    "Email sent"
                );
                DeliveryResult::delivered(
                    format!("Email sent to {} recipient(s)", count),
                    elapsed_seconds(started),
                )
            }
            Err(e) => {
                tracing::warn!(
                    host = %credentials.host,
                    kind = %e.kind(),
                    error = %e,
                    "Email sending failed"
                );
                e.into_result(elapsed_seconds(started))
            }
        }
    }

    fn transport_name(&self) -> &'static str {
        "smtp"
    }
}
