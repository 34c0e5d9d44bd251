use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    db::DbPool,
    domain::access::{comment_access, post_access},
    error::{require_field, AppError},
    handlers::posts::fetch_post,
    models::{
        comment::{Comment, CommentPayload},
        user::Claims,
    },
    state::AppState,
};

const COMMENT_SELECT: &str = "SELECT cm.id, cm.text, cm.post_id, cm.author_id, \
            u.username AS author_username, cm.created_at \
     FROM comments cm \
     JOIN users u ON u.id = cm.author_id";

/// All comments under a post, in display order: oldest first.
pub(crate) async fn comments_for_post(
    pool: &DbPool,
    post_id: i64,
) -> Result<Vec<Comment>, AppError> {
    let comments = sqlx::query_as::<_, Comment>(&comments_for_post_query())
        .bind(post_id)
        .fetch_all(pool)
        .await?;
    Ok(comments)
}

fn comments_for_post_query() -> String {
    format!("{COMMENT_SELECT} WHERE cm.post_id = $1 ORDER BY cm.created_at ASC")
}

async fn fetch_comment(
    pool: &DbPool,
    post_id: i64,
    comment_id: i64,
) -> Result<Option<Comment>, AppError> {
    let comment =
        sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE cm.id = $1 AND cm.post_id = $2"))
            .bind(comment_id)
            .bind(post_id)
            .fetch_optional(pool)
            .await?;
    Ok(comment)
}

// POST /api/posts/:post_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_field("text", &payload.text)?;

    // Commenting on a post you cannot see is the same as a missing post.
    let post = fetch_post(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !post_access(Some(&claims), &post, Utc::now()).can_view() {
        return Err(AppError::NotFound);
    }

    let comment_id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (text, post_id, author_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&payload.text)
    .bind(post_id)
    .bind(claims.user_id)
    .fetch_one(&state.pool)
    .await?;

    let comment = fetch_comment(&state.pool, post_id, comment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

// PUT /api/posts/:post_id/comments/:comment_id
pub async fn update_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CommentPayload>,
) -> Result<Json<Comment>, AppError> {
    require_field("text", &payload.text)?;

    let comment = fetch_comment(&state.pool, post_id, comment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !comment_access(Some(&claims), &comment, false).can_edit() {
        return Err(AppError::Denied(format!("/api/posts/{post_id}")));
    }

    sqlx::query("UPDATE comments SET text = $1 WHERE id = $2")
        .bind(&payload.text)
        .bind(comment_id)
        .execute(&state.pool)
        .await?;

    let updated = fetch_comment(&state.pool, post_id, comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

// DELETE /api/posts/:post_id/comments/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let comment = fetch_comment(&state.pool, post_id, comment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !comment_access(Some(&claims), &comment, false).can_edit() {
        return Err(AppError::Denied(format!("/api/posts/{post_id}")));
    }

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "deleted": comment_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_listing_orders_oldest_first() {
        assert!(comments_for_post_query().ends_with("ORDER BY cm.created_at ASC"));
    }
}
