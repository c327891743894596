use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentWithAuthor, Post, PostStatus, PostWithAuthor, Role, Tag, User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with identity and credential-token lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Set a user's role. Returns the updated user, or `None` if absent.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<User>, RepoError>;

    /// Mark the user carrying this verification token as verified and clear
    /// the token. Returns `None` when no user carries the token.
    async fn verify_email(&self, token: &str) -> Result<Option<User>, RepoError>;

    /// Attach a password-reset token with an expiry to the user with this
    /// email address.
    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError>;

    /// Replace the password hash of the user carrying this unexpired reset
    /// token, clearing the token. Returns `None` when the token is unknown
    /// or expired as of `now`.
    async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError>;
}

/// Post repository: lookups, list queries, and the conditional lifecycle
/// updates that keep check-then-act races out of the application layer.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Fast-path uniqueness probe for one slug candidate. The store's
    /// unique constraint remains authoritative.
    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;

    async fn list_published(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;

    async fn list_by_status(
        &self,
        status: PostStatus,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid, limit: u64) -> Result<Vec<Post>, RepoError>;

    async fn list_by_tag(
        &self,
        tag_slug: &str,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;

    /// Substring search over title/summary/content of published posts.
    async fn search_published(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;

    /// Atomically move a post from `from` to `to` in a single conditional
    /// write. Returns the updated post, or `None` when the post is absent
    /// or no longer in `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: PostStatus,
        to: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;

    /// Atomically publish a post currently in a publishable status, setting
    /// `published_at` only if unset. Returns `None` when the post is absent
    /// or not publishable.
    async fn mark_published(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Post>, RepoError>;

    async fn tags_of(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError>;

    /// Replace the post's tag set.
    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError>;
}

/// Comment repository. Read queries only ever surface approved comments.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    async fn list_approved(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError>;

    /// Approve a comment. Returns the updated comment, or `None` if absent.
    async fn approve(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;
}
