use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
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
        category::{Category, CreateCategoryPayload},
        post::PostRecord,
    },
    state::AppState,
    utils::slug::slugify,
};

#[derive(Debug, Serialize)]
pub struct CategoryPosts {
    pub category: Category,
    pub posts: Page<PostRecord>,
}

// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, title, description, slug, is_published, created_at \
         FROM categories WHERE is_published = TRUE ORDER BY title ASC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(categories))
}

// GET /api/categories/:slug/posts?page=N
//
// An unpublished category 404s along with everything in it, even when
// the individual posts are published.
pub async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CategoryPosts>, AppError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, title, description, slug, is_published, created_at \
         FROM categories WHERE slug = $1 AND is_published = TRUE",
    )
    .bind(&slug)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)?;

    let now = Utc::now();

    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM posts p \
         LEFT JOIN categories c ON c.id = p.category_id \
         WHERE {PUBLIC_CLAUSE} AND p.category_id = $2"
    ))
    .bind(now)
    .bind(category.id)
    .fetch_one(&state.pool)
    .await?;

    let items = sqlx::query_as::<_, PostRecord>(&format!(
        "{POST_SELECT} WHERE {PUBLIC_CLAUSE} AND p.category_id = $2 \
         ORDER BY p.pub_date DESC LIMIT $3 OFFSET $4"
    ))
    .bind(now)
    .bind(category.id)
    .bind(PAGE_SIZE)
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(CategoryPosts {
        category,
        posts: Page::new(items, query.number(), count),
    }))
}

// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_field("title", &payload.title)?;

    let slug = match payload.slug {
        Some(slug) => slug,
        None => slugify(&payload.title),
    };
    require_field("slug", &slug)?;

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (title, description, slug, is_published) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, title, description, slug, is_published, created_at",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&slug)
    .bind(payload.is_published.unwrap_or(true))
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
