//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::Workflow;
use quill_core::ports::{Mailer, TokenService};
use quill_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository, connect,
};
use quill_infra::{Argon2PasswordService, JwtTokenService, LogMailer, MarkdownRenderer, SmtpMailer};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub token_service: Arc<dyn TokenService>,
}

impl AppState {
    /// Connect the database and wire the workflow with its collaborators.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db = connect(&config.database).await?;

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp.clone())?),
            None => {
                tracing::warn!("SMTP_HOST not set; email links go to the log");
                Arc::new(LogMailer::new(config.base_url.clone()))
            }
        };

        let workflow = Workflow::new(
            Arc::new(PostgresUserRepository::new(db.clone())),
            Arc::new(PostgresPostRepository::new(db.clone())),
            Arc::new(PostgresTagRepository::new(db.clone())),
            Arc::new(PostgresCommentRepository::new(db)),
            Arc::new(MarkdownRenderer::new()),
            mailer,
            Arc::new(Argon2PasswordService::new(&config.argon2)?),
        );

        tracing::info!("Application state initialized");

        Ok(Self {
            workflow: Arc::new(workflow),
            token_service: Arc::new(JwtTokenService::from_env()),
        })
    }
}
