//! Email collaborator.
//!
//! Fire-and-forget: workflow operations log send failures and still
//! succeed.

use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError>;

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError>;
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to build message: {0}")]
    Message(String),

    #[error("transport failure: {0}")]
    Transport(String),
}
