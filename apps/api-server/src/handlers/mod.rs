//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/verify-email", web::get().to(auth::verify_email))
                    .route("/forgot-password", web::post().to(auth::forgot_password))
                    .route("/reset-password", web::post().to(auth::reset_password)),
            )
            // Blog routes. Literal segments register before parameterized
            // ones so /posts/search does not match /posts/{id}.
            .service(
                web::scope("/blog")
                    .route("/posts", web::get().to(blog::list_published))
                    .route("/posts", web::post().to(blog::create_post))
                    .route("/posts/search", web::get().to(blog::search_posts))
                    .route("/posts/mine", web::get().to(blog::my_posts))
                    .route("/posts/review-queue", web::get().to(blog::review_queue))
                    .route("/posts/slug/{slug}", web::get().to(blog::post_by_slug))
                    .route("/posts/{id}", web::put().to(blog::update_post))
                    .route("/posts/{id}", web::delete().to(blog::delete_post))
                    .route("/posts/{id}/submit", web::post().to(blog::submit_post))
                    .route("/posts/{id}/publish", web::post().to(blog::publish_post))
                    .route("/posts/{id}/comments", web::get().to(blog::list_comments))
                    .route("/posts/{id}/comments", web::post().to(blog::add_comment))
                    .route(
                        "/comments/{id}/approve",
                        web::post().to(blog::approve_comment),
                    )
                    .route("/tags", web::get().to(blog::list_tags))
                    .route("/tags", web::post().to(blog::create_tag))
                    .route("/tags/{slug}/posts", web::get().to(blog::posts_by_tag)),
            )
            // Administration
            .service(
                web::scope("/admin")
                    .route("/users/{id}/role", web::put().to(auth::change_role)),
            ),
    );
}
