use axum::{Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    adapters::http::{app_state::AppState, extract::Json},
    app_error::AppResult,
    domain::entities::user_role::UserRole,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Deserialize)]
struct RegisterPayload {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<UserRole>,
}

async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<(StatusCode, Json<Value>)> {
    app_state
        .user_use_cases
        .register(
            &payload.username,
            &payload.email,
            &payload.password,
            payload.role.unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    access_token: String,
}

async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<LoginResponse>> {
    let access_token = app_state
        .user_use_cases
        .authenticate(&payload.username, &payload.password)
        .await?;
    Ok(Json(LoginResponse { access_token }))
}
