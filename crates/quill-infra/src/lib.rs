//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL persistence via SeaORM, JWT + Argon2 authentication,
//! markdown rendering with HTML sanitization, and SMTP email delivery.

pub mod auth;
pub mod database;
pub mod mail;
pub mod render;

pub use auth::{Argon2Config, Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, connect};
pub use mail::{LogMailer, SmtpConfig, SmtpMailer};
pub use render::MarkdownRenderer;
