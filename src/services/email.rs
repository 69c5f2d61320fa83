//! # Email Service
//!
//! Outbound mail behind a trait so the cancellation flow never depends on a
//! concrete provider. Handlers build an [`EmailMessage`] and hand it to
//! whichever [`EmailService`] `lib::app` selected from `APP_ENV`; tests
//! inject their own capture implementation.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Errors that can occur during email operations
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// A fully rendered message ready for delivery.
///
/// Construction happens through the per-flow builders below, so the HTML
/// templates live here rather than in the handlers.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub recipient_name: String,
    pub recipient_address: String,
    pub subject: String,
    pub body_html: String,
}

impl EmailMessage {
    /// Builds the notice sent to a provider when a booking of theirs is
    /// canceled. `formatted_date` is the pt-BR rendering of the slot.
    pub fn cancellation_notice(
        provider_name: &str,
        provider_address: &str,
        user_name: &str,
        formatted_date: &str,
    ) -> Self {
        Self {
            recipient_name: provider_name.to_string(),
            recipient_address: provider_address.to_string(),
            subject: "Agendamento cancelado".to_string(),
            body_html: format!(
                "<p>Olá, {provider_name},</p>\
                 <p>O agendamento de {user_name} para o {formatted_date} foi cancelado.</p>"
            ),
        }
    }

    /// The recipient in `Name <addr>` form, as mail APIs expect it.
    pub fn recipient(&self) -> String {
        format!("{} <{}>", self.recipient_name, self.recipient_address)
    }
}

/// Trait for email sending services
///
/// Callers treat delivery as best-effort: the cancellation handler logs a
/// failed send and still answers 200, so implementations must not panic on
/// provider outages.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Hands a message off to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::SendFailed`] when the provider refuses or never
    /// receives the message.
    async fn send_email(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Email service for development: logs the message instead of delivering it,
/// so local runs never touch a real mail provider.
pub struct LogEmailer;

#[async_trait]
impl EmailService for LogEmailer {
    #[instrument(skip_all, fields(recipient = %message.recipient(), subject = %message.subject))]
    async fn send_email(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(body = %message.body_html, "Mock email sent");
        Ok(())
    }
}

/// Production email service backed by an external HTTP mail API.
///
/// # Configuration
///
/// Requires the following environment variables in production:
/// - `MAIL_API_URL` - Base URL of the email API
/// - `MAIL_API_KEY` - Authentication key for the email API
/// - `SENDER_EMAIL` - Email address to use as sender
pub struct ExternalEmailer {
    api_url: String,
    api_key: String,
    sender_email: String,
    http_client: reqwest::Client,
}

impl ExternalEmailer {
    pub fn new(api_url: String, api_key: String, sender_email: String) -> Self {
        info!(
            api_url = %api_url,
            sender_email = %sender_email,
            "Initializing external email service"
        );

        Self {
            api_url,
            api_key,
            sender_email,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailService for ExternalEmailer {
    #[instrument(
        skip_all,
        fields(
            recipient = %message.recipient(),
            subject = %message.subject,
            sender = %self.sender_email
        )
    )]
    async fn send_email(&self, message: &EmailMessage) -> Result<(), EmailError> {
        debug!("Sending HTTP request to email API");

        let payload = json!({
            "to": message.recipient(),
            "from": self.sender_email,
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.body_html }]
        });

        let response = self
            .http_client
            .post(&self.api_url)
            .basic_auth("api", Some(&self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Network request to email API failed");
                EmailError::SendFailed(format!("Network request error: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response body".to_string());
            error!(
                status = %status,
                error_body = %error_body,
                "External email API returned error"
            );
            return Err(EmailError::SendFailed(format!(
                "Mail provider answered {status}: {error_body}"
            )));
        }

        info!("Email sent successfully via external API");
        Ok(())
    }
}
