use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    error::AppError,
    models::user::{Claims, User},
    state::AppState,
};

pub fn issue_token(user: &User, ttl_hours: i64, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires = now + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user.username.clone(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
        user_id: user.id,
        role: user.role.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Token)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Identity for routes that are open to everyone but behave differently
/// for the resource owner. A bad token is treated as anonymous.
pub fn optional_identity(
    header: Option<&TypedHeader<Authorization<Bearer>>>,
    secret: &str,
) -> Option<Claims> {
    header.and_then(|auth| decode_token(auth.token(), secret).ok())
}

/// Runs before every authenticated route; attaches the decoded claims
/// as a request extension for the handlers downstream. A missing
/// header is the same 401 as a bad token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(auth) = auth.ok_or(AppError::Unauthorized)?;
    let claims = decode_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub async fn admin_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(auth) = auth.ok_or(AppError::Unauthorized)?;
    let claims = decode_token(auth.token(), &state.config.jwt_secret)?;
    if !claims.is_admin() {
        return Err(AppError::Forbidden);
    }
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::ROLE_USER;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            role: ROLE_USER.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips() {
        let token = issue_token(&sample_user(), 24, "secret").unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "alice");
        assert!(!claims.is_admin());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&sample_user(), 24, "secret").unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(&sample_user(), -1, "secret").unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}
