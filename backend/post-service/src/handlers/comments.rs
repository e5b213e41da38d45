/// Comment handlers - HTTP endpoints for comment operations
use super::PaginationParams;
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

/// Request body for creating or editing a comment
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Create a new comment
pub async fn create_comment(
    service: web::Data<CommentService>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .create_comment(*post_id, user_id.0, &req.text)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Get comments for a post
pub async fn list_comments(
    service: web::Data<CommentService>,
    post_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let comments = service
        .list_comments(*post_id, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// Get a single comment
pub async fn get_comment(
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = service.get_comment(post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Update a comment
pub async fn update_comment(
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
    user_id: UserId,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = service
        .update_comment(post_id, comment_id, user_id.0, &req.text)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment
pub async fn delete_comment(
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    service.delete_comment(post_id, comment_id, user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
