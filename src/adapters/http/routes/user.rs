use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    adapters::http::{
        app_state::AppState,
        auth::CurrentUser,
        extract::{Json, Path},
    },
    app_error::AppResult,
    domain::entities::user_role::UserRole,
    use_cases::user::UserProfile,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(get_me))
        .route(
            "/users/{id}",
            get(get_user).delete(delete_user).patch(update_user),
        )
}

async fn get_me(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let profile = app_state.user_use_cases.get_self(&caller).await?;
    Ok(Json(profile))
}

async fn list_users(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = app_state.user_use_cases.list(&caller).await?;
    Ok(Json(users))
}

async fn get_user(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let profile = app_state.user_use_cases.get(id, &caller).await?;
    Ok(Json(profile))
}

async fn delete_user(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    app_state.user_use_cases.delete(id, &caller).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

#[derive(Deserialize)]
struct UpdateUserPayload {
    #[serde(default)]
    role: Option<UserRole>,
}

async fn update_user(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> AppResult<Json<UserProfile>> {
    let profile = app_state
        .user_use_cases
        .update_role(id, payload.role, &caller)
        .await?;
    Ok(Json(profile))
}
