//! PostgreSQL persistence via SeaORM.

pub mod connections;
pub mod entity;
pub mod postgres_base;
pub mod postgres_repo;

mod tests;

pub use connections::{DatabaseConfig, connect};
pub use postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};
