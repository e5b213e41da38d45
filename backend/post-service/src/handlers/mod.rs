/// HTTP handlers for post-service
///
/// - Posts: create (with images and location), read, list, update, delete, image download
/// - Likes: like, unlike, count
/// - Comments: create, list, read, update, delete
pub mod comments;
pub mod likes;
pub mod posts;

pub use comments::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use likes::{get_like_count, like_post, unlike_post};
pub use posts::{create_post, delete_post, get_image, get_post, list_posts, update_post};

use actix_web::web;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Register the `/api/v1/posts` routes. Expects `PostService`, `LikeRegistry`
/// and `CommentService` as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/posts")
            .service(
                web::resource("")
                    .route(web::post().to(create_post))
                    .route(web::get().to(list_posts)),
            )
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(get_post))
                    .route(web::patch().to(update_post))
                    .route(web::delete().to(delete_post)),
            )
            .route("/{post_id}/images/{image_id}", web::get().to(get_image))
            .service(
                web::resource("/{post_id}/like")
                    .route(web::post().to(like_post))
                    .route(web::delete().to(unlike_post)),
            )
            .route("/{post_id}/likes", web::get().to(get_like_count))
            .service(
                web::resource("/{post_id}/comments")
                    .route(web::post().to(create_comment))
                    .route(web::get().to(list_comments)),
            )
            .service(
                web::resource("/{post_id}/comments/{comment_id}")
                    .route(web::get().to(get_comment))
                    .route(web::patch().to(update_comment))
                    .route(web::delete().to(delete_comment)),
            ),
    );
}
