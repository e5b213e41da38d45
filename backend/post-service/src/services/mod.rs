/// Business logic layer for post-service
///
/// - Location resolver: geocoding with failure isolation
/// - Post service: creation workflow, reads, owner-scoped updates and deletes
/// - Like registry: unique likes and like counts
/// - Comment service: comment lifecycle and text validation
pub mod comments;
pub mod likes;
pub mod location;
pub mod posts;

pub use comments::{validate_comment_text, CommentService};
pub use likes::LikeRegistry;
pub use location::LocationResolver;
pub use posts::PostService;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp client-supplied pagination to sane bounds
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
