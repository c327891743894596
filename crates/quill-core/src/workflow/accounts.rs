//! Registration, login, credential-token flows, and user administration.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::policy::{Action, can_perform};

use super::{PASSWORD_MIN, Registration, USERNAME_MAX, USERNAME_MIN, Workflow, new_token};

const RESET_TOKEN_TTL_HOURS: i64 = 1;

impl Workflow {
    /// Register a new author account and send the verification email.
    ///
    /// The email send is fire-and-forget: a transport failure is logged
    /// and registration still succeeds.
    pub async fn register(&self, input: Registration) -> Result<User, DomainError> {
        validate_registration(&input)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Conflict("email already registered".into()));
        }
        if self
            .users
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict("username already taken".into()));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let token = new_token();

        let user = User::new(input.username, input.email, password_hash, token.clone());
        let user = self.users.create(user).await?;

        if let Err(err) = self.mailer.send_verification(&user.email, &token).await {
            tracing::warn!(user_id = %user.id, error = %err, "verification email failed");
        }

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Confirm an email address by its verification token.
    pub async fn verify_email(&self, token: &str) -> Result<User, DomainError> {
        self.users
            .verify_email(token)
            .await?
            .ok_or_else(|| DomainError::validation("invalid or expired verification token"))
    }

    /// Check credentials and return the user. The failure is deliberately
    /// opaque: wrong email, wrong password, and unverified accounts all
    /// surface as Unauthorized.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !user.email_verified {
            return Err(DomainError::Unauthorized);
        }

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }

    /// The authenticated user's own record.
    pub async fn current_user(&self, actor_id: Uuid) -> Result<User, DomainError> {
        self.actor(actor_id).await
    }

    /// Start a password reset. Succeeds outwardly whether or not the email
    /// is registered, to prevent account enumeration.
    pub async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(());
        };

        let token = new_token();
        let expiry = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        self.users
            .set_reset_token(&user.email, &token, expiry)
            .await?;

        if let Err(err) = self.mailer.send_password_reset(&user.email, &token).await {
            tracing::warn!(user_id = %user.id, error = %err, "password reset email failed");
        }

        Ok(())
    }

    /// Complete a password reset with an unexpired token.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<User, DomainError> {
        if password.chars().count() < PASSWORD_MIN {
            return Err(DomainError::validation(
                "password must be at least 8 characters",
            ));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        self.users
            .reset_password(token, &password_hash, Utc::now())
            .await?
            .ok_or_else(|| DomainError::validation("invalid or expired reset token"))
    }

    /// Change another user's role. Admin only.
    pub async fn change_user_role(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<User, DomainError> {
        let actor = self.actor(actor_id).await?;
        if !can_perform(actor.role, false, Action::ChangeUserRole) {
            return Err(DomainError::Forbidden);
        }

        let user = self
            .users
            .set_role(user_id, role)
            .await?
            .ok_or(DomainError::not_found("user"))?;

        tracing::info!(user_id = %user.id, role = role.as_str(), "user role changed");
        Ok(user)
    }
}

fn validate_registration(input: &Registration) -> Result<(), DomainError> {
    let username_len = input.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
        return Err(DomainError::validation(
            "username must be between 3 and 255 characters",
        ));
    }
    let email = input.email.as_str();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(DomainError::validation("invalid email address"));
    }
    if input.password.chars().count() < PASSWORD_MIN {
        return Err(DomainError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}
