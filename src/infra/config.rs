use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;

use crate::infra::error::InfraError;

/// Credentials of the primary administrator seeded on first start.
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

pub struct AppConfig {
    pub database_url: SecretString,
    pub database_max_connections: u32,
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub admin: AdminSeed,
    /// JSON log file. `None` when `LOG_FILE` is set to an empty string.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let database_url = SecretString::new(get_env::<String>("DATABASE_URL").into());
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);

        let jwt_secret = SecretString::new(get_env::<String>("JWT_SECRET").into());
        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 86_400);

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 5000)),
        );
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        let admin = AdminSeed {
            username: get_env_default("ADMIN_USERNAME", String::from("admin")),
            email: get_env_default("ADMIN_EMAIL", String::from("admin@example.com")),
            password: SecretString::new(
                get_env_default("ADMIN_PASSWORD", String::from("admin123")).into(),
            ),
        };

        let log_file: String = get_env_default("LOG_FILE", String::from("app.log"));
        let log_file = Some(log_file).filter(|path| !path.is_empty());

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            bind_addr,
            cors_origin,
            admin,
            log_file,
        })
    }
}
