use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde_json::{Value, json};

use crate::{
    adapters::http::{
        app_state::AppState,
        auth::CurrentUser,
        extract::{Json, Path},
    },
    app_error::AppResult,
    use_cases::plan::{CreatePlanInput, PlanProfile, PublicPlan, UpdatePlanInput},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_active_plans).post(create_plan))
        .route("/plans/all", get(list_all_plans))
        .route(
            "/plans/{id}",
            put(update_plan).patch(update_plan).delete(delete_plan),
        )
}

async fn list_active_plans(State(app_state): State<AppState>) -> AppResult<Json<Vec<PublicPlan>>> {
    let plans = app_state.plan_use_cases.list_active().await?;
    Ok(Json(plans))
}

async fn list_all_plans(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> AppResult<Json<Vec<PlanProfile>>> {
    let plans = app_state.plan_use_cases.list_all(&caller).await?;
    Ok(Json(plans))
}

async fn create_plan(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreatePlanInput>,
) -> AppResult<(StatusCode, Json<PlanProfile>)> {
    let plan = app_state.plan_use_cases.create(payload, &caller).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

// PUT and PATCH both apply only the fields present in the body.
async fn update_plan(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePlanInput>,
) -> AppResult<Json<PlanProfile>> {
    let plan = app_state.plan_use_cases.update(id, payload, &caller).await?;
    Ok(Json(plan))
}

async fn delete_plan(
    State(app_state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    app_state.plan_use_cases.delete(id, &caller).await?;
    Ok(Json(json!({ "message": "Plan deleted successfully" })))
}
