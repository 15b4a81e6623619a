pub mod auth;
pub mod plan;
pub mod subscription;
pub mod user;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(user::router())
        .merge(plan::router())
        .merge(subscription::router())
}
