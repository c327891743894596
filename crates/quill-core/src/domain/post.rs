use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Tag, User};

/// Lifecycle state of a post.
///
/// ARCHIVED is terminal and not reachable through the workflow operations;
/// it exists so archived rows written by other tooling round-trip cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Review,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::Review => "REVIEW",
            PostStatus::Published => "PUBLISHED",
            PostStatus::Archived => "ARCHIVED",
        }
    }

    /// Only drafts can be submitted for review.
    pub fn submittable(&self) -> bool {
        matches!(self, PostStatus::Draft)
    }

    /// Publishing is allowed from REVIEW, and from DRAFT as the documented
    /// editor shortcut. An already published or archived post cannot be
    /// published again, which keeps the first-publish timestamp stable.
    pub fn publishable(&self) -> bool {
        matches!(self, PostStatus::Draft | PostStatus::Review)
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(PostStatus::Draft),
            "REVIEW" => Ok(PostStatus::Review),
            "PUBLISHED" => Ok(PostStatus::Published),
            "ARCHIVED" => Ok(PostStatus::Archived),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// Post entity - a piece of blog content.
///
/// `html_content` is always a sanitized re-derivation of `content`; it is
/// never edited independently. The slug is globally unique and only changes
/// when the title changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub html_content: String,
    pub status: PostStatus,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_robots: Option<String>,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new draft with generated ID and timestamps.
    pub fn new(
        author_id: Uuid,
        title: String,
        slug: String,
        content: String,
        html_content: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            summary: None,
            content,
            html_content,
            status: PostStatus::Draft,
            meta_title: None,
            meta_description: None,
            canonical_url: None,
            meta_robots: None,
            featured_image: None,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }
}

/// A post joined with its author, as returned by list queries.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: User,
}

/// A fully hydrated post: the entity, its author, and its tags.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub author: User,
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_drafts_are_submittable() {
        assert!(PostStatus::Draft.submittable());
        assert!(!PostStatus::Review.submittable());
        assert!(!PostStatus::Published.submittable());
        assert!(!PostStatus::Archived.submittable());
    }

    #[test]
    fn published_and_archived_are_not_publishable() {
        assert!(PostStatus::Draft.publishable());
        assert!(PostStatus::Review.publishable());
        assert!(!PostStatus::Published.publishable());
        assert!(!PostStatus::Archived.publishable());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            PostStatus::Draft,
            PostStatus::Review,
            PostStatus::Published,
            PostStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<PostStatus>().unwrap(), status);
        }
    }
}
