use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::{require_field, AppError},
    models::user::{AuthResponse, LoginPayload, RegisterPayload, User, ROLE_USER},
    state::AppState,
    utils::{
        jwt::issue_token,
        security::{hash_password, verify_password},
    },
};

const MIN_PASSWORD_LEN: usize = 8;

// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_field("username", &payload.username)?;
    require_field("email", &payload.email)?;
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation {
            field: "password",
            message: "must be at least 8 characters",
        });
    }

    let password_hash = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, first_name, last_name, role) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, username, email, password_hash, first_name, last_name, role, created_at",
    )
    .bind(payload.username.trim())
    .bind(payload.email.trim())
    .bind(&password_hash)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(ROLE_USER)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, first_name, last_name, role, created_at \
         FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(
        &user,
        state.config.token_ttl_hours,
        &state.config.jwt_secret,
    )?;

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
    }))
}
