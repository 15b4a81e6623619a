use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::authorization::Caller,
};

/// The authenticated caller, resolved from `Authorization: Bearer <token>` against the user
/// store. Handlers that take this extractor require authentication.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Caller);

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingToken)?;
    let value = header
        .to_str()
        .map_err(|_| AppError::InvalidToken("Authorization header is not valid text".into()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::InvalidToken("Expected a Bearer token".into()))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let caller = state.user_use_cases.resolve_caller(token).await?;
        Ok(CurrentUser(caller))
    }
}
