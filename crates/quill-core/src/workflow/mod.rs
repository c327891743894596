//! Workflow orchestrator.
//!
//! Composes the slug generator, the post state machine, and the access
//! control policy into the operations exposed to the HTTP layer. Every
//! operation follows the same shape: resolve the actor and ownership,
//! consult the policy, fail without mutating anything on deny, then apply
//! the change as one unit and return the hydrated entity.
//!
//! All collaborators are injected at construction; there are no lazily
//! materialized singletons.

mod accounts;
mod moderation;
mod posts;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostDetail, User};
use crate::error::DomainError;
use crate::ports::{
    CommentRepository, ContentRenderer, Mailer, PasswordService, PostRepository, TagRepository,
    UserRepository,
};
use crate::slug;

pub(crate) const TITLE_MAX: usize = 500;
pub(crate) const META_TITLE_MAX: usize = 60;
pub(crate) const META_DESCRIPTION_MAX: usize = 160;
pub(crate) const META_ROBOTS_MAX: usize = 50;
pub(crate) const TAG_NAME_MAX: usize = 100;
pub(crate) const USERNAME_MIN: usize = 3;
pub(crate) const USERNAME_MAX: usize = 255;
pub(crate) const PASSWORD_MIN: usize = 8;

/// Fields accepted when creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_robots: Option<String>,
    pub featured_image: Option<String>,
    pub tag_ids: Vec<Uuid>,
}

/// Partial update of a post; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_robots: Option<String>,
    pub featured_image: Option<String>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Fields accepted when registering a user.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The workflow orchestrator.
pub struct Workflow {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    renderer: Arc<dyn ContentRenderer>,
    mailer: Arc<dyn Mailer>,
    passwords: Arc<dyn PasswordService>,
}

impl Workflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
        renderer: Arc<dyn ContentRenderer>,
        mailer: Arc<dyn Mailer>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            posts,
            tags,
            comments,
            renderer,
            mailer,
            passwords,
        }
    }

    /// Resolve the acting user. A session id that no longer maps to a user
    /// is treated as unauthenticated, not as a missing entity.
    pub(crate) async fn actor(&self, actor_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(actor_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    /// Derive a unique slug for a title, probing the store one candidate at
    /// a time. Titles that slugify to nothing get a generated fallback.
    pub(crate) async fn unique_slug(
        &self,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let base = match slug::generate_slug(title) {
            s if s.is_empty() => slug::fallback_slug("post"),
            s => s,
        };

        for candidate in slug::candidates(&base) {
            if !self.posts.slug_in_use(&candidate, exclude).await? {
                return Ok(candidate);
            }
        }
        unreachable!("candidate sequence is infinite")
    }

    /// Load the author and tags for a post.
    pub(crate) async fn hydrate(&self, post: Post) -> Result<PostDetail, DomainError> {
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or(DomainError::not_found("author"))?;
        let tags = self.posts.tags_of(post.id).await?;

        Ok(PostDetail { post, author, tags })
    }
}

/// New verification/reset token: 32 hex characters, unguessable.
pub(crate) fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}
