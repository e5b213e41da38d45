/// Like handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::{LikeRegistry, PostService};
use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub status: &'static str,
    pub like_count: i64,
}

#[derive(Debug, Serialize)]
pub struct LikeCountResponse {
    pub post_id: Uuid,
    pub like_count: i64,
}

/// Like a post. A repeated like is answered with 409.
pub async fn like_post(
    registry: web::Data<LikeRegistry>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let like_count = registry.add_like(user_id.0, *post_id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        status: "success",
        like_count,
    }))
}

/// Remove the caller's like
pub async fn unlike_post(
    registry: web::Data<LikeRegistry>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let like_count = registry.remove_like(user_id.0, *post_id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        status: "success",
        like_count,
    }))
}

pub async fn get_like_count(
    registry: web::Data<LikeRegistry>,
    posts: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    posts.ensure_post_exists(post_id).await?;
    let like_count = registry.count_likes(post_id).await?;

    Ok(HttpResponse::Ok().json(LikeCountResponse {
        post_id,
        like_count,
    }))
}
