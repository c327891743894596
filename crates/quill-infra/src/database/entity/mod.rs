//! SeaORM entities mirroring the schema, with conversions to and from
//! the domain types.

pub mod comment;
pub mod enums;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;
