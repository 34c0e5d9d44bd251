use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::{require_field, AppError},
    models::location::{CreateLocationPayload, Location},
    state::AppState,
};

// GET /api/locations
pub async fn list_locations(State(state): State<AppState>) -> Result<Json<Vec<Location>>, AppError> {
    let locations = sqlx::query_as::<_, Location>(
        "SELECT id, name, is_published, created_at \
         FROM locations WHERE is_published = TRUE ORDER BY name ASC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(locations))
}

// POST /api/admin/locations
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_field("name", &payload.name)?;

    let location = sqlx::query_as::<_, Location>(
        "INSERT INTO locations (name, is_published) VALUES ($1, $2) \
         RETURNING id, name, is_published, created_at",
    )
    .bind(payload.name.trim())
    .bind(payload.is_published.unwrap_or(true))
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(location)))
}
