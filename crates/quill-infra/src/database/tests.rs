#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use quill_core::domain::{Post, PostStatus, Role, User};
    use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

    use crate::database::entity::{enums, post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

    fn post_model(status: enums::PostStatus) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id: uuid::Uuid::new_v4(),
            author_id: uuid::Uuid::new_v4(),
            title: "Field Notes".to_owned(),
            slug: "field-notes".to_owned(),
            summary: None,
            content: "body".to_owned(),
            html_content: "<p>body</p>".to_owned(),
            status,
            meta_title: None,
            meta_description: None,
            canonical_url: None,
            meta_robots: None,
            featured_image: None,
            created_at: now.into(),
            updated_at: now.into(),
            published_at: None,
        }
    }

    #[tokio::test]
    async fn find_post_by_id_maps_to_domain() {
        let model = post_model(enums::PostStatus::Draft);
        let post_id = model.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.id, post_id);
        assert_eq!(found.title, "Field Notes");
        assert_eq!(found.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn find_by_slug_misses_cleanly() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo.find_by_slug("no-such-slug").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn find_user_by_email_maps_role() {
        let now = chrono::Utc::now();
        let user_id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                username: "field-editor".to_owned(),
                email: "editor@example.com".to_owned(),
                password_hash: "argon2-hash".to_owned(),
                role: enums::UserRole::Editor,
                bio: None,
                avatar_url: None,
                email_verified: true,
                verification_token: None,
                reset_token: None,
                reset_token_expiry: None,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let result: Option<User> = repo.find_by_email("editor@example.com").await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.id, user_id);
        assert_eq!(found.role, Role::Editor);
    }

    #[tokio::test]
    async fn transition_status_returns_updated_row() {
        let model = post_model(enums::PostStatus::Review);
        let post_id = model.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo
            .transition_status(
                post_id,
                PostStatus::Draft,
                PostStatus::Review,
                chrono::Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(result.unwrap().status, PostStatus::Review);
    }

    #[tokio::test]
    async fn transition_status_affecting_no_rows_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo
            .mark_published(uuid::Uuid::new_v4(), chrono::Utc::now())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result: Result<(), _> =
            BaseRepository::<Post, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4()).await;

        assert!(result.is_err());
    }
}
