//! Post lifecycle operations and read queries.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Post, PostDetail, PostStatus, PostWithAuthor};
use crate::error::DomainError;
use crate::policy::{Action, can_perform};
use crate::text::truncate_description;

use super::{
    META_DESCRIPTION_MAX, META_ROBOTS_MAX, META_TITLE_MAX, NewPost, PostPatch, TITLE_MAX, Workflow,
};

const DEFAULT_PAGE: u64 = 20;
const DEFAULT_ADMIN_PAGE: u64 = 50;
const SEARCH_LIMIT: u64 = 50;

impl Workflow {
    /// Create a draft owned by the actor. The slug is derived from the
    /// title and made unique; the markdown is rendered and sanitized before
    /// anything is stored.
    pub async fn create_post(
        &self,
        actor_id: Uuid,
        input: NewPost,
    ) -> Result<PostDetail, DomainError> {
        let actor = self.actor(actor_id).await?;
        if !can_perform(actor.role, true, Action::CreatePost) {
            return Err(DomainError::Forbidden);
        }
        validate_new(&input)?;

        let slug = self.unique_slug(&input.title, None).await?;
        let html = self.renderer.render_html(&input.content);

        let mut post = Post::new(actor.id, input.title, slug, input.content, html);
        post.meta_description = input
            .meta_description
            .as_deref()
            .or(input.summary.as_deref())
            .map(|d| truncate_description(d, META_DESCRIPTION_MAX));
        post.summary = input.summary;
        post.meta_title = input.meta_title;
        post.canonical_url = input.canonical_url;
        post.meta_robots = input.meta_robots;
        post.featured_image = input.featured_image;

        let post = self.posts.create(post).await?;
        if !input.tag_ids.is_empty() {
            self.posts.set_tags(post.id, &input.tag_ids).await?;
        }

        tracing::info!(post_id = %post.id, slug = %post.slug, "post created");
        self.hydrate(post).await
    }

    /// Update fields of a post. Does not change the lifecycle status. A
    /// title change re-derives the slug; a content change re-derives the
    /// sanitized HTML.
    pub async fn update_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        patch: PostPatch,
    ) -> Result<PostDetail, DomainError> {
        let mut post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::not_found("post"))?;
        let actor = self.actor(actor_id).await?;

        let is_owner = post.author_id == actor.id;
        if !can_perform(actor.role, is_owner, Action::EditPost) {
            return Err(DomainError::Forbidden);
        }
        validate_patch(&patch)?;

        if let Some(title) = patch.title {
            if title != post.title {
                post.slug = self.unique_slug(&title, Some(post.id)).await?;
            }
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.html_content = self.renderer.render_html(&content);
            post.content = content;
        }
        if let Some(summary) = patch.summary {
            post.summary = Some(summary);
        }
        if let Some(meta_title) = patch.meta_title {
            post.meta_title = Some(meta_title);
        }
        if let Some(desc) = patch.meta_description {
            post.meta_description = Some(truncate_description(&desc, META_DESCRIPTION_MAX));
        }
        if let Some(url) = patch.canonical_url {
            post.canonical_url = Some(url);
        }
        if let Some(robots) = patch.meta_robots {
            post.meta_robots = Some(robots);
        }
        if let Some(image) = patch.featured_image {
            post.featured_image = Some(image);
        }
        post.updated_at = Utc::now();

        let post = self.posts.update(post).await?;
        if let Some(tag_ids) = patch.tag_ids {
            self.posts.set_tags(post.id, &tag_ids).await?;
        }

        self.hydrate(post).await
    }

    /// Submit a draft for review: DRAFT -> REVIEW, owner only.
    ///
    /// The transition is a single conditional write, so two racing submits
    /// cannot both succeed.
    pub async fn submit_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
    ) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::not_found("post"))?;
        let actor = self.actor(actor_id).await?;

        let is_owner = post.author_id == actor.id;
        if !can_perform(actor.role, is_owner, Action::SubmitPost) {
            return Err(DomainError::Forbidden);
        }

        let now = Utc::now();
        match self
            .posts
            .transition_status(post_id, PostStatus::Draft, PostStatus::Review, now)
            .await?
        {
            Some(updated) => {
                tracing::info!(post_id = %updated.id, "post submitted for review");
                self.hydrate(updated).await
            }
            None => Err(self.transition_failure(post_id, "submit").await?),
        }
    }

    /// Publish a post: editorial roles only. Permitted from REVIEW, and
    /// from DRAFT as the editor shortcut. `published_at` is set on the
    /// first publish and never overwritten.
    pub async fn publish_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
    ) -> Result<PostDetail, DomainError> {
        let actor = self.actor(actor_id).await?;
        if !can_perform(actor.role, false, Action::PublishPost) {
            return Err(DomainError::Forbidden);
        }

        let now = Utc::now();
        match self.posts.mark_published(post_id, now).await? {
            Some(updated) => {
                tracing::info!(post_id = %updated.id, slug = %updated.slug, "post published");
                self.hydrate(updated).await
            }
            None => Err(self.transition_failure(post_id, "publish").await?),
        }
    }

    /// Delete a post, cascading its tag links and comments. Owner or admin.
    pub async fn delete_post(&self, actor_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::not_found("post"))?;
        let actor = self.actor(actor_id).await?;

        let is_owner = post.author_id == actor.id;
        if !can_perform(actor.role, is_owner, Action::DeletePost) {
            return Err(DomainError::Forbidden);
        }

        self.posts.delete(post_id).await?;
        tracing::info!(post_id = %post_id, "post deleted");
        Ok(())
    }

    /// Distinguish a missing post from a disallowed state after a
    /// conditional write affected zero rows.
    async fn transition_failure(
        &self,
        post_id: Uuid,
        action: &'static str,
    ) -> Result<DomainError, DomainError> {
        match self.posts.find_by_id(post_id).await? {
            None => Ok(DomainError::not_found("post")),
            Some(post) => Ok(DomainError::InvalidTransition {
                from: post.status,
                action,
            }),
        }
    }

    // Read queries.

    /// Published posts, newest first.
    pub async fn published_posts(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let rows = self
            .posts
            .list_published(limit.unwrap_or(DEFAULT_PAGE), offset.unwrap_or(0))
            .await?;
        Ok(rows)
    }

    /// Public lookup by slug; only published posts are visible.
    pub async fn post_by_slug(&self, slug: &str) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .filter(|p| p.status == PostStatus::Published)
            .ok_or(DomainError::not_found("post"))?;
        self.hydrate(post).await
    }

    /// Substring search across published posts.
    pub async fn search_posts(&self, query: &str) -> Result<Vec<PostWithAuthor>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("search query is required"));
        }
        Ok(self.posts.search_published(query, SEARCH_LIMIT).await?)
    }

    /// Published posts carrying a tag. The tag itself must exist; an
    /// unknown slug is NotFound rather than an empty listing.
    pub async fn posts_by_tag(
        &self,
        tag_slug: &str,
        limit: Option<u64>,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let tag = self
            .tags
            .find_by_slug(tag_slug)
            .await?
            .ok_or(DomainError::not_found("tag"))?;

        Ok(self
            .posts
            .list_by_tag(&tag.slug, limit.unwrap_or(DEFAULT_PAGE))
            .await?)
    }

    /// The actor's own posts in any status.
    pub async fn my_posts(
        &self,
        actor_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, DomainError> {
        let actor = self.actor(actor_id).await?;
        Ok(self
            .posts
            .list_by_author(actor.id, limit.unwrap_or(DEFAULT_ADMIN_PAGE))
            .await?)
    }

    /// Editorial queue: posts by status, editorial roles only.
    pub async fn posts_by_status(
        &self,
        actor_id: Uuid,
        status: Option<PostStatus>,
        limit: Option<u64>,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let actor = self.actor(actor_id).await?;
        if !actor.role.is_editorial() {
            return Err(DomainError::Forbidden);
        }

        Ok(self
            .posts
            .list_by_status(
                status.unwrap_or(PostStatus::Review),
                limit.unwrap_or(DEFAULT_ADMIN_PAGE),
            )
            .await?)
    }
}

fn validate_new(input: &NewPost) -> Result<(), DomainError> {
    if input.title.trim().is_empty() {
        return Err(DomainError::validation("title is required"));
    }
    if input.title.chars().count() > TITLE_MAX {
        return Err(DomainError::validation("title is too long"));
    }
    if input.content.trim().is_empty() {
        return Err(DomainError::validation("content is required"));
    }
    validate_meta(
        input.meta_title.as_deref(),
        input.meta_robots.as_deref(),
        input.canonical_url.as_deref(),
    )
}

fn validate_patch(patch: &PostPatch) -> Result<(), DomainError> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if title.chars().count() > TITLE_MAX {
            return Err(DomainError::validation("title is too long"));
        }
    }
    if let Some(content) = &patch.content {
        if content.trim().is_empty() {
            return Err(DomainError::validation("content must not be empty"));
        }
    }
    validate_meta(
        patch.meta_title.as_deref(),
        patch.meta_robots.as_deref(),
        patch.canonical_url.as_deref(),
    )
}

fn validate_meta(
    meta_title: Option<&str>,
    meta_robots: Option<&str>,
    canonical_url: Option<&str>,
) -> Result<(), DomainError> {
    if let Some(meta_title) = meta_title {
        if meta_title.chars().count() > META_TITLE_MAX {
            return Err(DomainError::validation("meta title exceeds 60 characters"));
        }
    }
    if let Some(robots) = meta_robots {
        if robots.chars().count() > META_ROBOTS_MAX {
            return Err(DomainError::validation("robots directive is too long"));
        }
    }
    if let Some(url) = canonical_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(DomainError::validation("canonical URL must be absolute"));
        }
    }
    Ok(())
}
