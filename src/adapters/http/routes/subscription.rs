use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    adapters::http::{
        app_state::AppState,
        auth::CurrentUser,
        extract::{Json, Path},
    },
    app_error::AppResult,
    use_cases::subscription::{AdminSubscriptionView, SubscriptionView},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(list_my_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/all", get(list_all_subscriptions))
        .route("/subscriptions/{id}", delete(cancel_subscription))
}

#[derive(Deserialize)]
struct CreateSubscriptionPayload {
    plan_id: i64,
}

async fn create_subscription(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreateSubscriptionPayload>,
) -> AppResult<(StatusCode, Json<SubscriptionView>)> {
    let subscription = app_state
        .subscription_use_cases
        .create(payload.plan_id, &caller)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn list_my_subscriptions(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> AppResult<Json<Vec<SubscriptionView>>> {
    let subscriptions = app_state.subscription_use_cases.list_mine(&caller).await?;
    Ok(Json(subscriptions))
}

async fn list_all_subscriptions(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> AppResult<Json<Vec<AdminSubscriptionView>>> {
    let subscriptions = app_state.subscription_use_cases.list_all(&caller).await?;
    Ok(Json(subscriptions))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let outcome = app_state
        .subscription_use_cases
        .cancel_or_delete(id, &caller)
        .await?;
    Ok(Json(json!({ "message": outcome.message() })))
}
