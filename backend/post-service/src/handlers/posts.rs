/// Post handlers - HTTP endpoints for post operations
use super::PaginationParams;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::ImagePayload;
use crate::services::PostService;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

/// Cap on the whole multipart body of one post, all photos included
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024; // 25MB guardrail

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub text: Option<String>,
    /// Empty string clears the location
    pub location_query: Option<String>,
}

/// Fields of a `multipart/form-data` post upload
#[derive(Debug, Default)]
pub struct PostForm {
    pub text: Option<String>,
    pub location_query: Option<String>,
    pub images: Vec<ImagePayload>,
}

/// Drain the multipart body into a `PostForm`.
///
/// Parts carrying a filename are images, kept in upload order. `text` and
/// `location_query` are plain fields; anything else is read and dropped.
pub async fn read_post_form(mut payload: Multipart, max_bytes: usize) -> Result<PostForm> {
    let mut form = PostForm::default();
    let mut total_bytes: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let name = field.name().unwrap_or_default().to_string();

        let data = read_field(&mut field, &mut total_bytes, max_bytes).await?;

        match (filename, name.as_str()) {
            (Some(filename), _) => form.images.push(ImagePayload::new(filename, data)),
            (None, "text") => form.text = Some(field_text(&name, data)?),
            (None, "location_query") => form.location_query = Some(field_text(&name, data)?),
            (None, _) => {}
        }
    }

    Ok(form)
}

async fn read_field(
    field: &mut Field,
    total_bytes: &mut usize,
    max_bytes: usize,
) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| AppError::BadRequest(format!("Upload read error: {}", e)))?;
        *total_bytes += bytes.len();
        if *total_bytes > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "upload exceeds {} byte limit",
                max_bytes
            )));
        }
        data.extend_from_slice(&bytes);
    }
    Ok(data)
}

fn field_text(name: &str, data: Vec<u8>) -> Result<String> {
    String::from_utf8(data)
        .map_err(|_| AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))
}

/// Create a new post from a multipart upload
pub async fn create_post(
    service: web::Data<PostService>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload, MAX_UPLOAD_BYTES).await?;
    let text = form
        .text
        .ok_or_else(|| AppError::BadRequest("Missing 'text' field".to_string()))?;

    let post = service
        .create_post(user_id.0, &text, form.location_query.as_deref(), form.images)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID, with comments
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let details = service.get_post(*post_id).await?;
    Ok(HttpResponse::Ok().json(details))
}

/// List posts, newest first
pub async fn list_posts(
    service: web::Data<PostService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let posts = service.list_posts(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Update text and/or location of the caller's post
pub async fn update_post(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .update_post(
            *post_id,
            user_id.0,
            req.text.as_deref(),
            req.location_query.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete the caller's post
pub async fn delete_post(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    service.delete_post(*post_id, user_id.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Raw image bytes
pub async fn get_image(
    service: web::Data<PostService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, image_id) = path.into_inner();
    let image = service.get_image(post_id, image_id).await?;

    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .body(image.data))
}
