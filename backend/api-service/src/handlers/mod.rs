/// HTTP handlers for the public API
///
/// Routes live under `/api/v1`. Endpoints that mix anonymous and
/// authenticated methods on one path are split into method-guarded
/// resources so each can carry its own auth middleware.
pub mod auth;
pub mod comments;
pub mod health;
pub mod hashtags;
pub mod media;
pub mod posts;
pub mod reactions;
pub mod users;

use crate::error::AppError;
use actix_middleware::{AccountGate, JwtAuthMiddleware};
use actix_web::{guard, web};
use std::sync::Arc;

/// JSON and path extraction failures use the API error envelope
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        AppError::BadRequest("invalid request body".to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected path parameter");
        AppError::BadRequest("invalid path parameter".to_string()).into()
    }));
}

/// Register every `/api/v1` route
pub fn configure(cfg: &mut web::ServiceConfig, gate: Arc<dyn AccountGate>) {
    let required = move || JwtAuthMiddleware::required(gate.clone());
    let optional = JwtAuthMiddleware::optional;

    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/refresh", web::post().to(auth::refresh))
            .route("/logout", web::post().to(auth::logout))
            .route(
                "/password-reset/request",
                web::post().to(auth::request_password_reset),
            )
            .route(
                "/password-reset/confirm",
                web::post().to(auth::confirm_password_reset),
            )
            .route("/email/verify", web::post().to(auth::verify_email))
            .service(
                web::resource("/me")
                    .wrap(required())
                    .route(web::get().to(auth::me)),
            )
            .service(
                web::resource("/revoke-all")
                    .wrap(required())
                    .route(web::post().to(auth::revoke_all)),
            )
            .service(
                web::resource("/email/resend")
                    .wrap(required())
                    .route(web::post().to(auth::resend_verification)),
            ),
    )
    .service(
        web::scope("/users")
            .service(
                web::resource("/me")
                    .guard(guard::Put())
                    .wrap(required())
                    .route(web::put().to(users::update_profile)),
            )
            .service(
                web::resource("/{username}")
                    .wrap(optional())
                    .route(web::get().to(users::get_user)),
            )
            .service(
                web::resource("/{username}/posts")
                    .wrap(optional())
                    .route(web::get().to(users::user_posts)),
            )
            .route("/{username}/followers", web::get().to(users::followers))
            .route("/{username}/following", web::get().to(users::following))
            .service(
                web::resource("/{username}/follow")
                    .wrap(required())
                    .route(web::post().to(users::follow))
                    .route(web::delete().to(users::unfollow)),
            ),
    )
    .service(
        web::scope("/posts")
            .service(
                web::resource(["", "/timeline"])
                    .guard(guard::Get())
                    .wrap(optional())
                    .route(web::get().to(posts::timeline)),
            )
            .service(
                web::resource("")
                    .wrap(required())
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/{id}")
                    .guard(guard::Get())
                    .wrap(optional())
                    .route(web::get().to(posts::get_post)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(required())
                    .route(web::put().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .service(
                web::resource("/{id}/comments")
                    .guard(guard::Get())
                    .route(web::get().to(comments::list_comments)),
            )
            .service(
                web::resource("/{id}/comments")
                    .wrap(required())
                    .route(web::post().to(comments::create_comment)),
            )
            .service(
                web::resource("/{id}/comments/{comment_id}")
                    .wrap(required())
                    .route(web::delete().to(comments::delete_post_comment)),
            )
            .service(
                web::resource("/{id}/like")
                    .wrap(required())
                    .route(web::post().to(reactions::like_post))
                    .route(web::delete().to(reactions::unlike_post)),
            )
            .route("/{id}/likes", web::get().to(reactions::post_likes))
            .service(
                web::resource("/{id}/bookmark")
                    .wrap(required())
                    .route(web::post().to(reactions::bookmark_post))
                    .route(web::delete().to(reactions::unbookmark_post)),
            )
            .service(
                web::resource("/{id}/media")
                    .wrap(required())
                    .route(web::post().to(media::upload_media)),
            ),
    )
    .service(
        web::resource("/comments/{id}")
            .wrap(required())
            .route(web::delete().to(comments::delete_comment)),
    )
    .service(
        web::resource("/media/{id}")
            .wrap(required())
            .route(web::delete().to(media::delete_media)),
    )
    .service(
        web::resource("/bookmarks")
            .wrap(required())
            .route(web::get().to(reactions::bookmarks)),
    )
    .service(
        web::scope("/hashtags")
            .route("/trending", web::get().to(hashtags::trending))
            .service(
                web::resource("/{name}/posts")
                    .wrap(optional())
                    .route(web::get().to(hashtags::hashtag_posts)),
            ),
    );
}
