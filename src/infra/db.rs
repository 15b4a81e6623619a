use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::{adapters::persistence::schema::ensure_schema, infra::config::AppConfig};

use super::error::InfraError;

pub async fn init_db(config: &AppConfig) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.expose_secret())
        .await
        .map_err(InfraError::DatabaseConnection)?;

    info!("Connected to database!");

    ensure_schema(&pool).await.map_err(InfraError::Schema)?;
    Ok(pool)
}
