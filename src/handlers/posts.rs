use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use serde_json::json;

use crate::{
    db::DbPool,
    domain::{
        access::post_access,
        pagination::{Page, PageQuery, PAGE_SIZE},
        visibility::PUBLIC_CLAUSE,
    },
    error::{require_field, AppError},
    models::{
        post::{CreatePostPayload, PostDetail, PostRecord, UpdatePostPayload},
        user::Claims,
    },
    state::AppState,
    utils::jwt::optional_identity,
};

/// The one post projection the whole crate queries: author, location
/// and category joined in, comment count annotated.
pub(crate) const POST_SELECT: &str = "SELECT p.id, p.title, p.text, p.pub_date, p.is_published, p.image_url, \
            p.author_id, u.username AS author_username, \
            l.name AS location_name, \
            p.category_id, c.slug AS category_slug, c.is_published AS category_is_published, \
            (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count, \
            p.created_at \
     FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN locations l ON l.id = p.location_id \
     LEFT JOIN categories c ON c.id = p.category_id";

pub(crate) async fn fetch_post(pool: &DbPool, id: i64) -> Result<Option<PostRecord>, AppError> {
    let post = sqlx::query_as::<_, PostRecord>(&format!("{POST_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

// GET /api/posts?page=N
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<PostRecord>>, AppError> {
    let now = Utc::now();

    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM posts p \
         LEFT JOIN categories c ON c.id = p.category_id \
         WHERE {PUBLIC_CLAUSE}"
    ))
    .bind(now)
    .fetch_one(&state.pool)
    .await?;

    let items = sqlx::query_as::<_, PostRecord>(&format!(
        "{POST_SELECT} WHERE {PUBLIC_CLAUSE} \
         ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3"
    ))
    .bind(now)
    .bind(PAGE_SIZE)
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(Page::new(items, query.number(), count)))
}

// GET /api/posts/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    maybe_auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<PostDetail>, AppError> {
    let requester = optional_identity(maybe_auth.as_ref(), &state.config.jwt_secret);

    let post = fetch_post(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // An invisible post looks exactly like a missing one to outsiders.
    if !post_access(requester.as_ref(), &post, Utc::now()).can_view() {
        return Err(AppError::NotFound);
    }

    let comments = crate::handlers::comments::comments_for_post(&state.pool, post_id).await?;

    Ok(Json(PostDetail { post, comments }))
}

// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_field("title", &payload.title)?;
    require_field("text", &payload.text)?;

    let pub_date = payload.pub_date.unwrap_or_else(Utc::now);
    let is_published = payload.is_published.unwrap_or(true);

    let post_id: i64 = sqlx::query_scalar(
        "INSERT INTO posts (title, text, pub_date, is_published, image_url, \
                            author_id, location_id, category_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&payload.title)
    .bind(&payload.text)
    .bind(pub_date)
    .bind(is_published)
    .bind(&payload.image_url)
    .bind(claims.user_id)
    .bind(payload.location_id)
    .bind(payload.category_id)
    .fetch_one(&state.pool)
    .await?;

    let post = fetch_post(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(post_id, author = %claims.sub, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

// PUT /api/posts/:post_id
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<Json<PostRecord>, AppError> {
    let post = fetch_post(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !post_access(Some(&claims), &post, Utc::now()).can_edit() {
        return Err(AppError::Denied(format!("/api/posts/{post_id}")));
    }

    if let Some(title) = &payload.title {
        require_field("title", title)?;
    }
    if let Some(text) = &payload.text {
        require_field("text", text)?;
    }

    // Nullable columns cannot use COALESCE: an explicit null must be
    // able to detach the image, location or category. The flag says
    // whether the field was sent at all.
    let set_image = payload.image_url.is_some();
    let set_location = payload.location_id.is_some();
    let set_category = payload.category_id.is_some();

    sqlx::query(
        "UPDATE posts SET \
            title = COALESCE($1, title), \
            text = COALESCE($2, text), \
            pub_date = COALESCE($3, pub_date), \
            is_published = COALESCE($4, is_published), \
            image_url = CASE WHEN $5 THEN $6 ELSE image_url END, \
            location_id = CASE WHEN $7 THEN $8 ELSE location_id END, \
            category_id = CASE WHEN $9 THEN $10 ELSE category_id END \
         WHERE id = $11",
    )
    .bind(&payload.title)
    .bind(&payload.text)
    .bind(payload.pub_date)
    .bind(payload.is_published)
    .bind(set_image)
    .bind(payload.image_url.flatten())
    .bind(set_location)
    .bind(payload.location_id.flatten())
    .bind(set_category)
    .bind(payload.category_id.flatten())
    .bind(post_id)
    .execute(&state.pool)
    .await?;

    let updated = fetch_post(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

// DELETE /api/posts/:post_id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let post = fetch_post(&state.pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !post_access(Some(&claims), &post, Utc::now()).can_edit() {
        return Err(AppError::Denied(format!("/api/posts/{post_id}")));
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&state.pool)
        .await?;

    tracing::info!(post_id, by = %claims.sub, "post deleted");
    Ok(Json(json!({ "deleted": post_id })))
}
