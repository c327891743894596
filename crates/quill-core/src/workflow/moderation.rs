//! Tag management and comment moderation.

use uuid::Uuid;

use crate::domain::{Comment, CommentWithAuthor, Tag};
use crate::error::DomainError;
use crate::policy::{Action, can_perform};
use crate::slug;

use super::{TAG_NAME_MAX, Workflow};

impl Workflow {
    /// Create a tag; the slug is derived from the name. Editorial roles
    /// only.
    pub async fn create_tag(&self, actor_id: Uuid, name: &str) -> Result<Tag, DomainError> {
        let actor = self.actor(actor_id).await?;
        if !actor.role.is_editorial() {
            return Err(DomainError::Forbidden);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("tag name is required"));
        }
        if name.chars().count() > TAG_NAME_MAX {
            return Err(DomainError::validation("tag name is too long"));
        }

        let tag_slug = match slug::generate_slug(name) {
            s if s.is_empty() => slug::fallback_slug("tag"),
            s => s,
        };

        // Name and slug are both unique; the store reports a duplicate as
        // a constraint violation which maps to Conflict.
        let tag = self.tags.create(Tag::new(name.to_string(), tag_slug)).await?;
        Ok(tag)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        Ok(self.tags.list_all().await?)
    }

    /// Leave a comment on a post. Any authenticated user; the comment
    /// starts unapproved and stays invisible until moderated.
    pub async fn add_comment(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let actor = self.actor(actor_id).await?;

        if content.trim().is_empty() {
            return Err(DomainError::validation("comment content is required"));
        }
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::not_found("post"))?;

        let comment = self
            .comments
            .create(Comment::new(post_id, actor.id, content.to_string()))
            .await?;
        Ok(comment)
    }

    /// Approved comments on a post, oldest first. Public.
    pub async fn comments_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, DomainError> {
        Ok(self.comments.list_approved(post_id).await?)
    }

    /// Approve a comment so it becomes publicly visible. Editorial roles
    /// only.
    pub async fn approve_comment(
        &self,
        actor_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let actor = self.actor(actor_id).await?;
        if !can_perform(actor.role, false, Action::ApproveComment) {
            return Err(DomainError::Forbidden);
        }

        self.comments
            .approve(comment_id)
            .await?
            .ok_or(DomainError::not_found("comment"))
    }
}
