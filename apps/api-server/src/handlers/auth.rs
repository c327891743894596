//! Authentication and account handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_shared::ApiResponse;
use quill_shared::dto::{
    AuthResponse, ChangeRoleRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, UserView,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let user = state.workflow.register(body.into_inner().into()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        UserView::from(user),
        "Registration successful. Check your inbox for a verification link.",
    )))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state.workflow.login(&req.email, &req.password).await?;

    let token = state
        .token_service
        .generate_token(user.id, &user.username, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_service.expiration_seconds(),
        user: user.into(),
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.workflow.current_user(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserView::from(user))))
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// GET /api/auth/verify-email?token=...
pub async fn verify_email(
    state: web::Data<AppState>,
    query: web::Query<VerifyEmailQuery>,
) -> AppResult<HttpResponse> {
    let user = state.workflow.verify_email(&query.token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        UserView::from(user),
        "Email address verified.",
    )))
}

/// POST /api/auth/forgot-password
///
/// Responds identically whether or not the address is registered.
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    state.workflow.forgot_password(&body.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        (),
        "If the address is registered, a reset link has been sent.",
    )))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .workflow
        .reset_password(&req.token, &req.password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        UserView::from(user),
        "Password updated.",
    )))
}

/// PUT /api/admin/users/{id}/role - Admin only
pub async fn change_role(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<uuid::Uuid>,
    body: web::Json<ChangeRoleRequest>,
) -> AppResult<HttpResponse> {
    let user = state
        .workflow
        .change_user_role(identity.user_id, path.into_inner(), body.role)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserView::from(user))))
}
