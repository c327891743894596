//! Email delivery.
//!
//! `SmtpMailer` is the production transport; `LogMailer` stands in when no
//! SMTP relay is configured and writes the links to the log instead.

pub mod smtp;

use async_trait::async_trait;

use quill_core::ports::{MailError, Mailer};

pub use smtp::{SmtpConfig, SmtpMailer};

/// Fallback mailer for local development. Verification and reset links
/// land in the log, so the flows stay testable without a relay.
pub struct LogMailer {
    base_url: String,
}

impl LogMailer {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        tracing::info!(
            email,
            link = format!("{}/verify-email?token={}", self.base_url, token),
            "verification email (log transport)"
        );
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError> {
        tracing::info!(
            email,
            link = format!("{}/reset-password?token={}", self.base_url, token),
            "password reset email (log transport)"
        );
        Ok(())
    }
}
