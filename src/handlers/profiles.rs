use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use serde::Serialize;

use crate::{
    domain::{
        pagination::{Page, PageQuery, PAGE_SIZE},
        visibility::PUBLIC_CLAUSE,
    },
    error::{require_field, AppError},
    handlers::posts::POST_SELECT,
    models::{
        post::PostRecord,
        user::{Claims, UpdateProfilePayload, User},
    },
    state::AppState,
    utils::jwt::optional_identity,
};

#[derive(Debug, Serialize)]
pub struct Profile {
    pub profile: User,
    pub posts: Page<PostRecord>,
}

async fn fetch_user(pool: &crate::db::DbPool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, first_name, last_name, role, created_at \
         FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

// GET /api/profiles/:username?page=N
//
// The owner sees all of their posts, scheduled and unpublished ones
// included; everyone else gets the public view.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    maybe_auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<Profile>, AppError> {
    let requester = optional_identity(maybe_auth.as_ref(), &state.config.jwt_secret);

    let user = fetch_user(&state.pool, &username)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_owner = requester
        .as_ref()
        .map_or(false, |claims| claims.user_id == user.id);

    let (count, items) = if is_owner {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts p WHERE p.author_id = $1")
            .bind(user.id)
            .fetch_one(&state.pool)
            .await?;
        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{POST_SELECT} WHERE p.author_id = $1 \
             ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user.id)
        .bind(PAGE_SIZE)
        .bind(query.offset())
        .fetch_all(&state.pool)
        .await?;
        (count, items)
    } else {
        let now = Utc::now();
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM posts p \
             LEFT JOIN categories c ON c.id = p.category_id \
             WHERE {PUBLIC_CLAUSE} AND p.author_id = $2"
        ))
        .bind(now)
        .bind(user.id)
        .fetch_one(&state.pool)
        .await?;
        let items = sqlx::query_as::<_, PostRecord>(&format!(
            "{POST_SELECT} WHERE {PUBLIC_CLAUSE} AND p.author_id = $2 \
             ORDER BY p.pub_date DESC LIMIT $3 OFFSET $4"
        ))
        .bind(now)
        .bind(user.id)
        .bind(PAGE_SIZE)
        .bind(query.offset())
        .fetch_all(&state.pool)
        .await?;
        (count, items)
    };

    Ok(Json(Profile {
        profile: user,
        posts: Page::new(items, query.number(), count),
    }))
}

// PUT /api/profiles/:username
pub async fn update_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<User>, AppError> {
    let user = fetch_user(&state.pool, &username)
        .await?
        .ok_or(AppError::NotFound)?;

    // A profile belongs to exactly one user; admins included, nobody
    // edits someone else's.
    if claims.user_id != user.id {
        return Err(AppError::Denied(format!("/api/profiles/{username}")));
    }

    if let Some(new_username) = &payload.username {
        require_field("username", new_username)?;
    }
    if let Some(email) = &payload.email {
        require_field("email", email)?;
    }

    // The name columns are nullable, so an explicit null clears them;
    // COALESCE would make that impossible.
    let set_first = payload.first_name.is_some();
    let set_last = payload.last_name.is_some();

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET \
            username = COALESCE($1, username), \
            email = COALESCE($2, email), \
            first_name = CASE WHEN $3 THEN $4 ELSE first_name END, \
            last_name = CASE WHEN $5 THEN $6 ELSE last_name END \
         WHERE id = $7 \
         RETURNING id, username, email, password_hash, first_name, last_name, role, created_at",
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(set_first)
    .bind(payload.first_name.flatten())
    .bind(set_last)
    .bind(payload.last_name.flatten())
    .bind(user.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(updated))
}
