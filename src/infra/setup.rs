use std::fs::File;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    infra::{config::AppConfig, error::InfraError, postgres_persistence},
    use_cases::{
        plan::{PlanRepo, PlanUseCases},
        subscription::{SubscriptionRepo, SubscriptionUseCases},
        user::{UserRepo, UserUseCases},
    },
};

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let postgres_arc = Arc::new(postgres_persistence(&config).await?);

    let user_use_cases = UserUseCases::new(
        postgres_arc.clone() as Arc<dyn UserRepo>,
        config.jwt_secret.clone(),
        config.access_token_ttl,
    );
    let plan_use_cases = PlanUseCases::new(postgres_arc.clone() as Arc<dyn PlanRepo>);
    let subscription_use_cases = SubscriptionUseCases::new(
        postgres_arc.clone() as Arc<dyn SubscriptionRepo>,
        postgres_arc as Arc<dyn PlanRepo>,
    );

    seed_primary_admin(&user_use_cases, &config).await?;

    Ok(AppState {
        config: Arc::new(config),
        user_use_cases: Arc::new(user_use_cases),
        plan_use_cases: Arc::new(plan_use_cases),
        subscription_use_cases: Arc::new(subscription_use_cases),
    })
}

async fn seed_primary_admin(users: &UserUseCases, config: &AppConfig) -> Result<(), InfraError> {
    let admin = &config.admin;
    let created = users
        .ensure_primary_admin(&admin.username, &admin.email, admin.password.expose_secret())
        .await
        .map_err(InfraError::AdminSeed)?;

    if !created {
        tracing::debug!(username = %admin.username, "Primary administrator already present");
    }
    Ok(())
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subscription_service=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs). Skipped rather than fatal when the file can't be created.
    let (json_layer, file_error) = match log_file.map(|path| (path, File::create(path))) {
        Some((_, Ok(file))) => {
            let layer = fmt::layer()
                .json()
                .with_writer(Arc::new(file))
                .with_current_span(true)
                .with_span_list(true);
            (Some(layer), None)
        }
        Some((path, Err(err))) => (None, Some((path, err))),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    if let Some((path, err)) = file_error {
        tracing::warn!(path, error = %err, "Cannot create log file, logging to console only");
    }
}
