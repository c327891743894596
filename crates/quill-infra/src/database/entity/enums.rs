//! String-backed column enums. Stored as varchar rather than native
//! Postgres enums so migrations can extend them without ALTER TYPE.

use sea_orm::entity::prelude::*;

use quill_core::domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UserRole {
    #[sea_orm(string_value = "AUTHOR")]
    Author,
    #[sea_orm(string_value = "EDITOR")]
    Editor,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl From<UserRole> for domain::Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Author => domain::Role::Author,
            UserRole::Editor => domain::Role::Editor,
            UserRole::Admin => domain::Role::Admin,
        }
    }
}

impl From<domain::Role> for UserRole {
    fn from(role: domain::Role) -> Self {
        match role {
            domain::Role::Author => UserRole::Author,
            domain::Role::Editor => UserRole::Editor,
            domain::Role::Admin => UserRole::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PostStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "REVIEW")]
    Review,
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    #[sea_orm(string_value = "ARCHIVED")]
    Archived,
}

impl From<PostStatus> for domain::PostStatus {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => domain::PostStatus::Draft,
            PostStatus::Review => domain::PostStatus::Review,
            PostStatus::Published => domain::PostStatus::Published,
            PostStatus::Archived => domain::PostStatus::Archived,
        }
    }
}

impl From<domain::PostStatus> for PostStatus {
    fn from(status: domain::PostStatus) -> Self {
        match status {
            domain::PostStatus::Draft => PostStatus::Draft,
            domain::PostStatus::Review => PostStatus::Review,
            domain::PostStatus::Published => PostStatus::Published,
            domain::PostStatus::Archived => PostStatus::Archived,
        }
    }
}
