//! Blog content handlers: posts, tags, and comments.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::PostStatus;
use quill_shared::ApiResponse;
use quill_shared::dto::{
    CommentView, CreateCommentRequest, CreatePostRequest, CreateTagRequest, PostDetailView,
    PostView, TagView, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQueueQuery {
    pub status: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/blog/posts - published posts, newest first.
pub async fn list_published(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .workflow
        .published_posts(query.limit, query.offset)
        .await?;

    let views: Vec<PostView> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}

/// POST /api/blog/posts - create a draft.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let detail = state
        .workflow
        .create_post(identity.user_id, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(PostDetailView::from(detail))))
}

/// GET /api/blog/posts/search?q=...
pub async fn search_posts(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.workflow.search_posts(&query.q).await?;

    let views: Vec<PostView> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}

/// GET /api/blog/posts/mine - the caller's posts in any status.
pub async fn my_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .workflow
        .my_posts(identity.user_id, query.limit)
        .await?;

    let views: Vec<PostView> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}

/// GET /api/blog/posts/review-queue - editorial queue, defaults to REVIEW.
pub async fn review_queue(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ReviewQueueQuery>,
) -> AppResult<HttpResponse> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<PostStatus>().map_err(AppError::BadRequest))
        .transpose()?;

    let posts = state
        .workflow
        .posts_by_status(identity.user_id, status, query.limit)
        .await?;

    let views: Vec<PostView> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}

/// GET /api/blog/posts/slug/{slug} - public post lookup.
pub async fn post_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let detail = state.workflow.post_by_slug(&path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailView::from(detail))))
}

/// PUT /api/blog/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let detail = state
        .workflow
        .update_post(identity.user_id, path.into_inner(), body.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailView::from(detail))))
}

/// DELETE /api/blog/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .workflow
        .delete_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/blog/posts/{id}/submit - DRAFT to REVIEW.
pub async fn submit_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .workflow
        .submit_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailView::from(detail))))
}

/// POST /api/blog/posts/{id}/publish - editorial publish.
pub async fn publish_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .workflow
        .publish_post(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailView::from(detail))))
}

/// GET /api/blog/posts/{id}/comments - approved comments, oldest first.
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state.workflow.comments_for_post(path.into_inner()).await?;

    let views: Vec<CommentView> = comments.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}

/// POST /api/blog/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .workflow
        .add_comment(identity.user_id, path.into_inner(), &body.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        CommentView::from(comment),
        "Comment submitted and awaiting moderation.",
    )))
}

/// POST /api/blog/comments/{id}/approve - editorial moderation.
pub async fn approve_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = state
        .workflow
        .approve_comment(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CommentView::from(comment))))
}

/// GET /api/blog/tags
pub async fn list_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.workflow.list_tags().await?;

    let views: Vec<TagView> = tags.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}

/// POST /api/blog/tags - editorial only.
pub async fn create_tag(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateTagRequest>,
) -> AppResult<HttpResponse> {
    let tag = state
        .workflow
        .create_tag(identity.user_id, &body.name)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(TagView::from(tag))))
}

/// GET /api/blog/tags/{slug}/posts - published posts carrying a tag.
pub async fn posts_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.workflow.posts_by_tag(&path, query.limit).await?;

    let views: Vec<PostView> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views)))
}
