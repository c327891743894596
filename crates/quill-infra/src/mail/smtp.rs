//! SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use quill_core::ports::{MailError, Mailer};

/// SMTP relay configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub base_url: String,
}

/// Mailer backed by an async SMTP transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    base_url: String,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::Message(e.to_string()))?;

        Ok(Self {
            transport,
            from,
            base_url: config.base_url,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::Message(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        let body = format!(
            "Welcome to Quill!\n\n\
             Please confirm your email address by opening this link:\n\n\
             {}/verify-email?token={}\n\n\
             If you did not create an account, you can ignore this message.\n",
            self.base_url, token
        );
        self.send(email, "Confirm your email address", body).await
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError> {
        let body = format!(
            "A password reset was requested for your account.\n\n\
             Open this link to choose a new password (valid for one hour):\n\n\
             {}/reset-password?token={}\n\n\
             If you did not request a reset, no action is needed.\n",
            self.base_url, token
        );
        self.send(email, "Reset your password", body).await
    }
}
