use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentWithAuthor, Post, PostStatus, PostWithAuthor, Role, Tag, User,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, BaseRepository, CommentRepository, ContentRenderer, MailError, Mailer,
    PasswordService, PostRepository, TagRepository, UserRepository,
};
use crate::workflow::{NewPost, PostPatch, Registration, Workflow};

// In-memory fakes over a shared store. The conditional updates mirror the
// single-statement semantics the Postgres adapter uses.

#[derive(Default)]
struct Store {
    users: Mutex<HashMap<Uuid, User>>,
    posts: Mutex<HashMap<Uuid, Post>>,
    tags: Mutex<HashMap<Uuid, Tag>>,
    post_tags: Mutex<HashMap<Uuid, Vec<Uuid>>>,
    comments: Mutex<HashMap<Uuid, Comment>>,
}

struct MemUsers(Arc<Store>);

#[async_trait]
impl BaseRepository<User, Uuid> for MemUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.0.users.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut rows = self.0.users.lock().unwrap();
        if rows
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepoError::Constraint("users unique".into()));
        }
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut rows = self.0.users.lock().unwrap();
        if !rows.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for MemUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<User>, RepoError> {
        let mut rows = self.0.users.lock().unwrap();
        Ok(rows.get_mut(&id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }

    async fn verify_email(&self, token: &str) -> Result<Option<User>, RepoError> {
        let mut rows = self.0.users.lock().unwrap();
        Ok(rows
            .values_mut()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .map(|u| {
                u.email_verified = true;
                u.verification_token = None;
                u.clone()
            }))
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let mut rows = self.0.users.lock().unwrap();
        Ok(rows.values_mut().find(|u| u.email == email).map(|u| {
            u.reset_token = Some(token.to_string());
            u.reset_token_expiry = Some(expiry);
            u.clone()
        }))
    }

    async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let mut rows = self.0.users.lock().unwrap();
        Ok(rows
            .values_mut()
            .find(|u| {
                u.reset_token.as_deref() == Some(token)
                    && u.reset_token_expiry.is_some_and(|exp| exp > now)
            })
            .map(|u| {
                u.password_hash = password_hash.to_string();
                u.reset_token = None;
                u.reset_token_expiry = None;
                u.clone()
            }))
    }
}

struct MemPosts(Arc<Store>);

impl MemPosts {
    fn author_of(&self, post: &Post) -> Option<User> {
        self.0.users.lock().unwrap().get(&post.author_id).cloned()
    }

    fn with_authors(&self, posts: Vec<Post>) -> Vec<PostWithAuthor> {
        posts
            .into_iter()
            .filter_map(|post| {
                self.author_of(&post)
                    .map(|author| PostWithAuthor { post, author })
            })
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for MemPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.posts.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.0.posts.lock().unwrap();
        if rows.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("posts_slug_key".into()));
        }
        rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.0.posts.lock().unwrap();
        if !rows.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if rows.values().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(RepoError::Constraint("posts_slug_key".into()));
        }
        rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let removed = self.0.posts.lock().unwrap().remove(&id);
        if removed.is_none() {
            return Err(RepoError::NotFound);
        }
        // Cascades, as the schema's FKs would do.
        self.0.post_tags.lock().unwrap().remove(&id);
        self.0.comments.lock().unwrap().retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemPosts {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        Ok(self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .any(|p| p.slug == slug && Some(p.id) != exclude))
    }

    async fn list_published(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        let posts = posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(self.with_authors(posts))
    }

    async fn list_by_status(
        &self,
        status: PostStatus,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        posts.truncate(limit as usize);
        Ok(self.with_authors(posts))
    }

    async fn list_by_author(&self, author_id: Uuid, limit: u64) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn list_by_tag(
        &self,
        tag_slug: &str,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let tag_id = match self
            .0
            .tags
            .lock()
            .unwrap()
            .values()
            .find(|t| t.slug == tag_slug)
        {
            Some(tag) => tag.id,
            None => return Ok(Vec::new()),
        };
        let links = self.0.post_tags.lock().unwrap();
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                p.status == PostStatus::Published
                    && links.get(&p.id).is_some_and(|ids| ids.contains(&tag_id))
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(limit as usize);
        Ok(self.with_authors(posts))
    }

    async fn search_published(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                p.status == PostStatus::Published
                    && (p.title.contains(query)
                        || p.content.contains(query)
                        || p.summary.as_deref().is_some_and(|s| s.contains(query)))
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(limit as usize);
        Ok(self.with_authors(posts))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: PostStatus,
        to: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut rows = self.0.posts.lock().unwrap();
        Ok(rows
            .get_mut(&id)
            .filter(|p| p.status == from)
            .map(|p| {
                p.status = to;
                p.updated_at = now;
                p.clone()
            }))
    }

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut rows = self.0.posts.lock().unwrap();
        Ok(rows
            .get_mut(&id)
            .filter(|p| p.status.publishable())
            .map(|p| {
                p.status = PostStatus::Published;
                p.published_at.get_or_insert(now);
                p.updated_at = now;
                p.clone()
            }))
    }

    async fn tags_of(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let links = self.0.post_tags.lock().unwrap();
        let tags = self.0.tags.lock().unwrap();
        Ok(links
            .get(&post_id)
            .map(|ids| ids.iter().filter_map(|id| tags.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        self.0
            .post_tags
            .lock()
            .unwrap()
            .insert(post_id, tag_ids.to_vec());
        Ok(())
    }
}

struct MemTags(Arc<Store>);

#[async_trait]
impl BaseRepository<Tag, Uuid> for MemTags {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.0.tags.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut rows = self.0.tags.lock().unwrap();
        if rows
            .values()
            .any(|t| t.name == tag.name || t.slug == tag.slug)
        {
            return Err(RepoError::Constraint("tags unique".into()));
        }
        rows.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn update(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut rows = self.0.tags.lock().unwrap();
        if !rows.contains_key(&tag.id) {
            return Err(RepoError::NotFound);
        }
        rows.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .tags
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TagRepository for MemTags {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self
            .0
            .tags
            .lock()
            .unwrap()
            .values()
            .find(|t| t.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        let mut tags: Vec<Tag> = self.0.tags.lock().unwrap().values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

struct MemComments(Arc<Store>);

#[async_trait]
impl BaseRepository<Comment, Uuid> for MemComments {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.0.comments.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.0
            .comments
            .lock()
            .unwrap()
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut rows = self.0.comments.lock().unwrap();
        if !rows.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        rows.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .comments
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for MemComments {
    async fn list_approved(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let users = self.0.users.lock().unwrap();
        let mut comments: Vec<Comment> = self
            .0
            .comments
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.post_id == post_id && c.approved)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                users.get(&comment.author_id).cloned().map(|author| {
                    CommentWithAuthor { comment, author }
                })
            })
            .collect())
    }

    async fn approve(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let mut rows = self.0.comments.lock().unwrap();
        Ok(rows.get_mut(&id).map(|c| {
            c.approved = true;
            c.clone()
        }))
    }
}

struct StubRenderer;

impl ContentRenderer for StubRenderer {
    fn render_html(&self, markdown: &str) -> String {
        format!("<p>{markdown}</p>")
    }
}

#[derive(Default)]
struct StubMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("smtp unavailable".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailError> {
        self.send_verification(email, token).await
    }
}

struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hash:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("hash:{password}"))
    }
}

struct Fixture {
    workflow: Workflow,
    store: Arc<Store>,
    mailer: Arc<StubMailer>,
}

fn fixture() -> Fixture {
    fixture_with_mailer(StubMailer::default())
}

fn fixture_with_mailer(mailer: StubMailer) -> Fixture {
    let store = Arc::new(Store::default());
    let mailer = Arc::new(mailer);
    let workflow = Workflow::new(
        Arc::new(MemUsers(store.clone())),
        Arc::new(MemPosts(store.clone())),
        Arc::new(MemTags(store.clone())),
        Arc::new(MemComments(store.clone())),
        Arc::new(StubRenderer),
        mailer.clone(),
        Arc::new(PlainPasswords),
    );
    Fixture {
        workflow,
        store,
        mailer,
    }
}

impl Fixture {
    fn seed_user(&self, role: Role) -> User {
        let id = Uuid::new_v4().simple().to_string();
        let mut user = User::new(
            format!("user-{}", &id[..8]),
            format!("{}@example.com", &id[..8]),
            "hash:password123".to_string(),
            "unused".to_string(),
        );
        user.role = role;
        user.email_verified = true;
        user.verification_token = None;
        self.store.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    fn post(&self, id: Uuid) -> Post {
        self.store.posts.lock().unwrap().get(&id).cloned().unwrap()
    }
}

fn draft(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "Some *markdown* body.".to_string(),
        ..NewPost::default()
    }
}

#[tokio::test]
async fn create_post_derives_slug_and_renders_html() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);

    let detail = fx
        .workflow
        .create_post(author.id, draft("Modern Surveillance Techniques!"))
        .await
        .unwrap();

    assert_eq!(detail.post.slug, "modern-surveillance-techniques");
    assert_eq!(detail.post.status, PostStatus::Draft);
    assert_eq!(detail.post.html_content, "<p>Some *markdown* body.</p>");
    assert_eq!(detail.author.id, author.id);
}

#[tokio::test]
async fn duplicate_title_gets_suffixed_slug() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);

    let first = fx
        .workflow
        .create_post(author.id, draft("Modern Surveillance Techniques!"))
        .await
        .unwrap();
    let second = fx
        .workflow
        .create_post(author.id, draft("Modern Surveillance Techniques!"))
        .await
        .unwrap();
    let third = fx
        .workflow
        .create_post(author.id, draft("Modern Surveillance Techniques!"))
        .await
        .unwrap();

    assert_eq!(first.post.slug, "modern-surveillance-techniques");
    assert_eq!(second.post.slug, "modern-surveillance-techniques-2");
    assert_eq!(third.post.slug, "modern-surveillance-techniques-3");
}

#[tokio::test]
async fn symbol_only_title_gets_fallback_slug() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);

    let detail = fx
        .workflow
        .create_post(author.id, draft("!!!"))
        .await
        .unwrap();

    assert!(detail.post.slug.starts_with("post-"));
    assert!(!detail.post.slug.is_empty());
}

#[tokio::test]
async fn unknown_actor_is_unauthenticated() {
    let fx = fixture();
    let result = fx.workflow.create_post(Uuid::new_v4(), draft("Title")).await;
    assert!(matches!(result, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn oversized_meta_title_is_rejected() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);

    let mut input = draft("Title");
    input.meta_title = Some("x".repeat(61));
    let result = fx.workflow.create_post(author.id, input).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn meta_description_falls_back_to_truncated_summary() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);

    let mut input = draft("Title");
    input.summary = Some("word ".repeat(60));
    let detail = fx.workflow.create_post(author.id, input).await.unwrap();

    let desc = detail.post.meta_description.unwrap();
    assert!(desc.chars().count() <= 160);
    assert!(desc.ends_with('\u{2026}'));
}

#[tokio::test]
async fn author_submits_own_draft() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();

    let submitted = fx
        .workflow
        .submit_post(author.id, detail.post.id)
        .await
        .unwrap();
    assert_eq!(submitted.post.status, PostStatus::Review);
}

#[tokio::test]
async fn other_author_cannot_submit_and_state_is_untouched() {
    let fx = fixture();
    let owner = fx.seed_user(Role::Author);
    let intruder = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(owner.id, draft("Mine")).await.unwrap();
    let before = fx.post(detail.post.id);

    let result = fx.workflow.submit_post(intruder.id, detail.post.id).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));

    let after = fx.post(detail.post.id);
    assert_eq!(after.status, PostStatus::Draft);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.slug, before.slug);
}

#[tokio::test]
async fn submit_from_review_is_invalid_transition() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();
    fx.workflow.submit_post(author.id, detail.post.id).await.unwrap();

    let result = fx.workflow.submit_post(author.id, detail.post.id).await;
    assert!(matches!(
        result,
        Err(DomainError::InvalidTransition {
            from: PostStatus::Review,
            ..
        })
    ));
}

#[tokio::test]
async fn editors_and_admins_cannot_submit() {
    let fx = fixture();
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(editor.id, draft("Editorial")).await.unwrap();

    let result = fx.workflow.submit_post(editor.id, detail.post.id).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));
}

#[tokio::test]
async fn author_cannot_publish() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();

    let result = fx.workflow.publish_post(author.id, detail.post.id).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));
    assert_eq!(fx.post(detail.post.id).status, PostStatus::Draft);
}

#[tokio::test]
async fn editor_publishes_review_post() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();
    fx.workflow.submit_post(author.id, detail.post.id).await.unwrap();

    let published = fx
        .workflow
        .publish_post(editor.id, detail.post.id)
        .await
        .unwrap();
    assert_eq!(published.post.status, PostStatus::Published);
    assert!(published.post.published_at.is_some());
}

#[tokio::test]
async fn editor_may_publish_straight_from_draft() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();

    let published = fx
        .workflow
        .publish_post(editor.id, detail.post.id)
        .await
        .unwrap();
    assert_eq!(published.post.status, PostStatus::Published);
}

#[tokio::test]
async fn second_publish_fails_and_published_at_is_stable() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();

    let first = fx
        .workflow
        .publish_post(editor.id, detail.post.id)
        .await
        .unwrap();
    let stamp = first.post.published_at.unwrap();

    let second = fx.workflow.publish_post(editor.id, detail.post.id).await;
    assert!(matches!(
        second,
        Err(DomainError::InvalidTransition {
            from: PostStatus::Published,
            ..
        })
    ));
    assert_eq!(fx.post(detail.post.id).published_at, Some(stamp));
}

#[tokio::test]
async fn publish_missing_post_is_not_found() {
    let fx = fixture();
    let editor = fx.seed_user(Role::Editor);

    let result = fx.workflow.publish_post(editor.id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn editing_content_rederives_html() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();

    let patch = PostPatch {
        content: Some("updated body".to_string()),
        ..PostPatch::default()
    };
    let updated = fx
        .workflow
        .update_post(author.id, detail.post.id, patch)
        .await
        .unwrap();

    assert_eq!(updated.post.content, "updated body");
    assert_eq!(updated.post.html_content, "<p>updated body</p>");
    assert_eq!(updated.post.status, PostStatus::Draft);
}

#[tokio::test]
async fn editing_title_rederives_unique_slug() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    fx.workflow.create_post(author.id, draft("Taken Title")).await.unwrap();
    let detail = fx.workflow.create_post(author.id, draft("Original")).await.unwrap();

    let patch = PostPatch {
        title: Some("Taken Title".to_string()),
        ..PostPatch::default()
    };
    let updated = fx
        .workflow
        .update_post(author.id, detail.post.id, patch)
        .await
        .unwrap();

    assert_eq!(updated.post.title, "Taken Title");
    assert_eq!(updated.post.slug, "taken-title-2");
}

#[tokio::test]
async fn saving_unchanged_title_keeps_slug() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(author.id, draft("Stable")).await.unwrap();

    let patch = PostPatch {
        title: Some("Stable".to_string()),
        summary: Some("new summary".to_string()),
        ..PostPatch::default()
    };
    let updated = fx
        .workflow
        .update_post(author.id, detail.post.id, patch)
        .await
        .unwrap();

    assert_eq!(updated.post.slug, "stable");
    assert_eq!(updated.post.summary.as_deref(), Some("new summary"));
}

#[tokio::test]
async fn non_owner_author_cannot_edit() {
    let fx = fixture();
    let owner = fx.seed_user(Role::Author);
    let intruder = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(owner.id, draft("Mine")).await.unwrap();
    let before = fx.post(detail.post.id);

    let patch = PostPatch {
        content: Some("defaced".to_string()),
        ..PostPatch::default()
    };
    let result = fx.workflow.update_post(intruder.id, detail.post.id, patch).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));

    let after = fx.post(detail.post.id);
    assert_eq!(after.content, before.content);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn editor_may_edit_any_post() {
    let fx = fixture();
    let owner = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(owner.id, draft("Mine")).await.unwrap();

    let patch = PostPatch {
        summary: Some("editorial touch".to_string()),
        ..PostPatch::default()
    };
    let updated = fx
        .workflow
        .update_post(editor.id, detail.post.id, patch)
        .await
        .unwrap();
    assert_eq!(updated.post.summary.as_deref(), Some("editorial touch"));
}

#[tokio::test]
async fn editor_cannot_delete_admin_can() {
    let fx = fixture();
    let owner = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let admin = fx.seed_user(Role::Admin);
    let detail = fx.workflow.create_post(owner.id, draft("Mine")).await.unwrap();
    let post_id = detail.post.id;

    let comment = fx
        .workflow
        .add_comment(owner.id, post_id, "first!")
        .await
        .unwrap();

    let result = fx.workflow.delete_post(editor.id, post_id).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));

    fx.workflow.delete_post(admin.id, post_id).await.unwrap();
    assert!(fx.store.posts.lock().unwrap().get(&post_id).is_none());
    assert!(fx.store.comments.lock().unwrap().get(&comment.id).is_none());
    assert!(fx.store.post_tags.lock().unwrap().get(&post_id).is_none());
}

#[tokio::test]
async fn owner_deletes_own_post() {
    let fx = fixture();
    let owner = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(owner.id, draft("Mine")).await.unwrap();

    fx.workflow.delete_post(owner.id, detail.post.id).await.unwrap();
    assert!(fx.store.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn post_by_slug_only_surfaces_published() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(author.id, draft("Hidden")).await.unwrap();

    let result = fx.workflow.post_by_slug("hidden").await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    fx.workflow.publish_post(editor.id, detail.post.id).await.unwrap();
    let found = fx.workflow.post_by_slug("hidden").await.unwrap();
    assert_eq!(found.post.id, detail.post.id);
}

#[tokio::test]
async fn review_queue_is_editorial_only() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();
    fx.workflow.submit_post(author.id, detail.post.id).await.unwrap();

    let denied = fx.workflow.posts_by_status(author.id, None, None).await;
    assert!(matches!(denied, Err(DomainError::Forbidden)));

    let queue = fx
        .workflow
        .posts_by_status(editor.id, None, None)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].post.id, detail.post.id);
}

#[tokio::test]
async fn registration_sends_verification_and_login_requires_it() {
    let fx = fixture();
    let user = fx
        .workflow
        .register(Registration {
            username: "casewriter".to_string(),
            email: "case@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::Author);
    assert!(!user.email_verified);

    let sent = fx.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "case@example.com");

    let denied = fx.workflow.login("case@example.com", "password123").await;
    assert!(matches!(denied, Err(DomainError::Unauthorized)));

    fx.workflow.verify_email(&sent[0].1).await.unwrap();
    let logged_in = fx
        .workflow
        .login("case@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);
}

#[tokio::test]
async fn registration_survives_mailer_outage() {
    let fx = fixture_with_mailer(StubMailer {
        fail: true,
        ..StubMailer::default()
    });

    let result = fx
        .workflow
        .register(Registration {
            username: "casewriter".to_string(),
            email: "case@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let fx = fixture();
    let reg = Registration {
        username: "casewriter".to_string(),
        email: "case@example.com".to_string(),
        password: "password123".to_string(),
    };
    fx.workflow.register(reg.clone()).await.unwrap();

    let mut other = reg;
    other.username = "othername".to_string();
    let result = fx.workflow.register(other).await;
    assert!(matches!(result, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn wrong_password_is_opaque_unauthorized() {
    let fx = fixture();
    let user = fx.seed_user(Role::Author);

    let result = fx.workflow.login(&user.email, "wrong-password").await;
    assert!(matches!(result, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn password_reset_round_trip() {
    let fx = fixture();
    let user = fx.seed_user(Role::Author);

    fx.workflow.forgot_password(&user.email).await.unwrap();
    let sent = fx.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);

    fx.workflow
        .reset_password(&sent[0].1, "new-password-99")
        .await
        .unwrap();
    let logged_in = fx.workflow.login(&user.email, "new-password-99").await.unwrap();
    assert_eq!(logged_in.id, user.id);

    // The token is single-use.
    let replay = fx.workflow.reset_password(&sent[0].1, "another-pass-1").await;
    assert!(matches!(replay, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn forgot_password_hides_unknown_addresses() {
    let fx = fixture();
    fx.workflow
        .forgot_password("nobody@example.com")
        .await
        .unwrap();
    assert!(fx.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn role_change_is_admin_only() {
    let fx = fixture();
    let admin = fx.seed_user(Role::Admin);
    let editor = fx.seed_user(Role::Editor);
    let author = fx.seed_user(Role::Author);

    let denied = fx
        .workflow
        .change_user_role(editor.id, author.id, Role::Editor)
        .await;
    assert!(matches!(denied, Err(DomainError::Forbidden)));

    let updated = fx
        .workflow
        .change_user_role(admin.id, author.id, Role::Editor)
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Editor);
}

#[tokio::test]
async fn comments_stay_hidden_until_approved() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);
    let reader = fx.seed_user(Role::Author);
    let detail = fx.workflow.create_post(author.id, draft("Mine")).await.unwrap();

    let comment = fx
        .workflow
        .add_comment(reader.id, detail.post.id, "interesting read")
        .await
        .unwrap();
    assert!(!comment.approved);
    assert!(fx
        .workflow
        .comments_for_post(detail.post.id)
        .await
        .unwrap()
        .is_empty());

    let denied = fx.workflow.approve_comment(reader.id, comment.id).await;
    assert!(matches!(denied, Err(DomainError::Forbidden)));

    fx.workflow.approve_comment(editor.id, comment.id).await.unwrap();
    let visible = fx.workflow.comments_for_post(detail.post.id).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].comment.id, comment.id);
    assert_eq!(visible[0].author.id, reader.id);
}

#[tokio::test]
async fn tags_flow_through_create_and_update() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);

    let denied = fx.workflow.create_tag(author.id, "Tradecraft").await;
    assert!(matches!(denied, Err(DomainError::Forbidden)));

    let tag = fx.workflow.create_tag(editor.id, "Tradecraft").await.unwrap();
    assert_eq!(tag.slug, "tradecraft");

    let mut input = draft("Tagged");
    input.tag_ids = vec![tag.id];
    let detail = fx.workflow.create_post(author.id, input).await.unwrap();
    assert_eq!(detail.tags.len(), 1);
    assert_eq!(detail.tags[0].id, tag.id);

    fx.workflow.publish_post(editor.id, detail.post.id).await.unwrap();
    let listed = fx.workflow.posts_by_tag("tradecraft", None).await.unwrap();
    assert_eq!(listed.len(), 1);

    let duplicate = fx.workflow.create_tag(editor.id, "Tradecraft").await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn browsing_an_unknown_tag_is_not_found() {
    let fx = fixture();
    let editor = fx.seed_user(Role::Editor);
    fx.workflow.create_tag(editor.id, "Tradecraft").await.unwrap();

    let missing = fx.workflow.posts_by_tag("no-such-tag", None).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    let known = fx.workflow.posts_by_tag("tradecraft", None).await.unwrap();
    assert!(known.is_empty());
}

#[tokio::test]
async fn search_requires_query_and_matches_published_only() {
    let fx = fixture();
    let author = fx.seed_user(Role::Author);
    let editor = fx.seed_user(Role::Editor);

    let hidden = fx
        .workflow
        .create_post(author.id, draft("Secret surveillance notes"))
        .await
        .unwrap();
    let visible = fx
        .workflow
        .create_post(author.id, draft("Public surveillance primer"))
        .await
        .unwrap();
    fx.workflow.publish_post(editor.id, visible.post.id).await.unwrap();

    let empty = fx.workflow.search_posts("   ").await;
    assert!(matches!(empty, Err(DomainError::Validation(_))));

    let hits = fx.workflow.search_posts("surveillance").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].post.id, visible.post.id);
    assert_ne!(hits[0].post.id, hidden.post.id);
}
