//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use quill_core::domain::{
    Comment, CommentWithAuthor, Post, PostStatus, PostWithAuthor, Role, Tag, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, TagRepository, UserRepository};

use super::entity::{comment, enums, post, post_tag, tag, user};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<post::Entity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<tag::Entity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<comment::Entity>;

// Keep raw addresses out of the logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at) if at > 1 => format!("{}***{}", &email[..1], &email[at..]),
        Some(at) => format!("***{}", &email[at..]),
        None => "***".to_string(),
    }
}

fn join_authors(rows: Vec<(post::Model, Option<user::Model>)>) -> Vec<PostWithAuthor> {
    rows.into_iter()
        .filter_map(|(p, a)| {
            a.map(|author| PostWithAuthor {
                post: p.into(),
                author: author.into(),
            })
        })
        .collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "finding user by email");

        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<User>, RepoError> {
        let Some(model) = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.role = Set(role.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await.map_err(map_db_err)?;

        Ok(Some(updated.into()))
    }

    async fn verify_email(&self, token: &str) -> Result<Option<User>, RepoError> {
        let Some(model) = user::Entity::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.email_verified = Set(true);
        active.verification_token = Set(None);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await.map_err(map_db_err)?;

        Ok(Some(updated.into()))
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let Some(model) = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.reset_token = Set(Some(token.to_string()));
        active.reset_token_expiry = Set(Some(expiry.into()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await.map_err(map_db_err)?;

        Ok(Some(updated.into()))
    }

    async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let cutoff: DateTimeWithTimeZone = now.into();

        let Some(model) = user::Entity::find()
            .filter(user::Column::ResetToken.eq(token))
            .filter(user::Column::ResetTokenExpiry.gt(cutoff))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        // The token filter repeats in the write so a concurrent reset with
        // the same token cannot apply twice.
        let result = user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::ResetToken, Expr::value(Option::<String>::None))
            .col_expr(
                user::Column::ResetTokenExpiry,
                Expr::value(Option::<DateTimeWithTimeZone>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(cutoff))
            .filter(user::Column::Id.eq(model.id))
            .filter(user::Column::ResetToken.eq(token))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        let updated = user::Entity::find_by_id(model.id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(updated.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        let mut query = post::Entity::find().filter(post::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(post::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await.map_err(map_db_err)?;
        Ok(count > 0)
    }

    async fn list_published(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = post::Entity::find()
            .filter(post::Column::Status.eq(enums::PostStatus::Published))
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::PublishedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(join_authors(rows))
    }

    async fn list_by_status(
        &self,
        status: PostStatus,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = post::Entity::find()
            .filter(post::Column::Status.eq(enums::PostStatus::from(status)))
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::UpdatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(join_authors(rows))
    }

    async fn list_by_author(&self, author_id: Uuid, limit: u64) -> Result<Vec<Post>, RepoError> {
        let rows = post::Entity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::UpdatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_tag(
        &self,
        tag_slug: &str,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let Some(tag_model) = tag::Entity::find()
            .filter(tag::Column::Slug.eq(tag_slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(Vec::new());
        };

        let post_ids: Vec<Uuid> = post_tag::Entity::find()
            .filter(post_tag::Column::TagId.eq(tag_model.id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|link| link.post_id)
            .collect();

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = post::Entity::find()
            .filter(post::Column::Id.is_in(post_ids))
            .filter(post::Column::Status.eq(enums::PostStatus::Published))
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(join_authors(rows))
    }

    async fn search_published(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = post::Entity::find()
            .filter(post::Column::Status.eq(enums::PostStatus::Published))
            .filter(
                Condition::any()
                    .add(post::Column::Title.contains(query))
                    .add(post::Column::Summary.contains(query))
                    .add(post::Column::Content.contains(query)),
            )
            .find_also_related(user::Entity)
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(join_authors(rows))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: PostStatus,
        to: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let stamp: DateTimeWithTimeZone = now.into();

        // Single conditional UPDATE; the status guard in the WHERE clause
        // makes racing transitions lose cleanly.
        let result = post::Entity::update_many()
            .col_expr(post::Column::Status, Expr::value(enums::PostStatus::from(to)))
            .col_expr(post::Column::UpdatedAt, Expr::value(stamp))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(enums::PostStatus::from(from)))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        let updated = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(updated.map(Into::into))
    }

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let stamp: DateTimeWithTimeZone = now.into();

        // COALESCE keeps the first-publish timestamp across any later
        // republish path.
        let result = post::Entity::update_many()
            .col_expr(
                post::Column::Status,
                Expr::value(enums::PostStatus::Published),
            )
            .col_expr(post::Column::UpdatedAt, Expr::value(stamp))
            .col_expr(
                post::Column::PublishedAt,
                Func::coalesce([
                    Expr::col(post::Column::PublishedAt).into(),
                    Expr::value(stamp),
                ])
                .into(),
            )
            .filter(post::Column::Id.eq(id))
            .filter(
                post::Column::Status
                    .is_in([enums::PostStatus::Draft, enums::PostStatus::Review]),
            )
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        let updated = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(updated.map(Into::into))
    }

    async fn tags_of(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let tag_ids: Vec<Uuid> = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();

        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let links = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(*tag_id),
        });
        post_tag::Entity::insert_many(links)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        let rows = tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_approved(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Approved.eq(true))
            .find_also_related(user::Entity)
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(c, a)| {
                a.map(|author| CommentWithAuthor {
                    comment: c.into(),
                    author: author.into(),
                })
            })
            .collect())
    }

    async fn approve(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let Some(model) = comment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.approved = Set(true);
        let updated = active.update(&self.db).await.map_err(map_db_err)?;

        Ok(Some(updated.into()))
    }
}
