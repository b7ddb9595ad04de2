//! Email service for invitation emails.
//!
//! Supports two providers:
//! - `console`: Logs emails (development)
//! - `sendgrid`: Uses the SendGrid API

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

/// Invitation details needed to write the email.
#[derive(Debug, Clone)]
pub struct InvitationEmail<'a> {
    pub to: &'a str,
    pub landlord_name: &'a str,
    pub property_address: &'a str,
    pub accept_url: &'a str,
    pub expiry_days: i64,
}

/// Outbound mail seam; tests swap in a recorder.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// Console provider - logs the email.
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );
        debug!(body = %message.body_text, "Email body (text)");
        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let mut content = vec![serde_json::json!({
            "type": "text/plain",
            "value": message.body_text
        })];
        if let Some(html) = &message.body_html {
            content.push(serde_json::json!({
                "type": "text/html",
                "value": html
            }));
        }

        let body = serde_json::json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": content
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(to = %message.to, subject = %message.subject, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }
}

/// Link a tenant follows to accept an invitation.
pub fn accept_url(base_url: &str, token: &uuid::Uuid) -> String {
    format!(
        "{}/invitations/accept/{}",
        base_url.trim_end_matches('/'),
        token
    )
}

pub fn invitation_message(invite: &InvitationEmail<'_>) -> EmailMessage {
    let body_text = format!(
        r#"Hello,

{landlord} has invited you to join Property Manager as the tenant of:

{address}

Accept the invitation here:

{url}

The invitation expires in {days} days. If you were not expecting it, you can ignore this email.
"#,
        landlord = invite.landlord_name,
        address = invite.property_address,
        url = invite.accept_url,
        days = invite.expiry_days,
    );

    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>You have been invited</h2>
    <p>{landlord} has invited you to join Property Manager as the tenant of <strong>{address}</strong>.</p>
    <p><a href="{url}" style="background: #2a6f97; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">Accept invitation</a></p>
    <p style="color: #666; font-size: 14px;">The invitation expires in {days} days.</p>
    <p style="color: #999; font-size: 12px;">Or paste this link into your browser:<br>{url}</p>
</body>
</html>"#,
        landlord = shared::html::escape(invite.landlord_name),
        address = shared::html::escape(invite.property_address),
        url = shared::html::escape(invite.accept_url),
        days = invite.expiry_days,
    );

    EmailMessage {
        to: invite.to.to_string(),
        subject: "Invitation to Property Manager".to_string(),
        body_text,
        body_html: Some(body_html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(enabled: bool, provider: &str) -> EmailConfig {
        EmailConfig {
            enabled,
            provider: provider.to_string(),
            sendgrid_api_key: String::new(),
            sender_email: "noreply@example.com".to_string(),
            sender_name: "Test".to_string(),
        }
    }

    #[test]
    fn test_accept_url_trims_trailing_slash() {
        let token = uuid::Uuid::nil();
        assert_eq!(
            accept_url("https://rent.example.com/", &token),
            "https://rent.example.com/invitations/accept/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_invitation_message_contents() {
        let message = invitation_message(&InvitationEmail {
            to: "tenant@example.com",
            landlord_name: "Anna <Nowak>",
            property_address: "Polna 1, 00-001 Warszawa",
            accept_url: "http://localhost/invitations/accept/x",
            expiry_days: 7,
        });
        assert_eq!(message.to, "tenant@example.com");
        assert!(message.body_text.contains("http://localhost/invitations/accept/x"));
        assert!(message.body_text.contains("7 days"));
        let html = message.body_html.unwrap();
        assert!(html.contains("Anna &lt;Nowak&gt;"));
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let service = EmailService::new(test_config(false, "sendgrid"));
        let message = EmailMessage {
            to: "a@example.com".to_string(),
            subject: "s".to_string(),
            body_text: "b".to_string(),
            body_html: None,
        };
        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_is_not_configured() {
        let service = EmailService::new(test_config(true, "sendgrid"));
        let message = EmailMessage {
            to: "a@example.com".to_string(),
            subject: "s".to_string(),
            body_text: "b".to_string(),
            body_html: None,
        };
        assert!(matches!(
            service.send(message).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let service = EmailService::new(test_config(true, "carrier-pigeon"));
        let message = EmailMessage {
            to: "a@example.com".to_string(),
            subject: "s".to_string(),
            body_text: "b".to_string(),
            body_html: None,
        };
        assert!(service.send(message).await.is_err());
    }
}
