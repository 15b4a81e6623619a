use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use secrecy::SecretString;
use serde::Serialize;
use time::Duration;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        authorization::Caller,
        jwt::{self, TokenIdentity},
        password, validators,
    },
    domain::entities::user_role::UserRole,
};

/// The seeded primary administrator. It can never be deleted.
pub const PRIMARY_ADMIN_ID: i64 = 1;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` if the username or email is taken.
    async fn create(&self, user: &NewUser) -> AppResult<UserProfile>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<UserProfile>>;
    async fn get_by_username(&self, username: &str) -> AppResult<Option<UserProfile>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
    async fn get_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>>;
    /// All users in insertion order.
    async fn list(&self) -> AppResult<Vec<UserProfile>>;
    async fn update_role(&self, id: i64, role: UserRole) -> AppResult<Option<UserProfile>>;
    /// Removes the user's subscriptions and then the user, atomically. False if absent.
    async fn delete_with_subscriptions(&self, id: i64) -> AppResult<bool>;
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

impl From<&UserProfile> for Caller {
    fn from(profile: &UserProfile) -> Self {
        Caller {
            id: profile.id,
            username: profile.username.clone(),
            role: profile.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub profile: UserProfile,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct UserUseCases {
    repo: Arc<dyn UserRepo>,
    jwt_secret: SecretString,
    access_token_ttl: Duration,
}

impl UserUseCases {
    pub fn new(
        repo: Arc<dyn UserRepo>,
        jwt_secret: SecretString,
        access_token_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            jwt_secret,
            access_token_ttl,
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> AppResult<UserProfile> {
        let username = username.trim();
        let email = email.trim();

        if !validators::is_valid_username(username) {
            return Err(AppError::InvalidInput(format!(
                "Username must be 1-{} characters",
                validators::MAX_USERNAME_LEN
            )));
        }
        if !validators::is_valid_email(email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        if password.is_empty() {
            return Err(AppError::InvalidInput("Password is required".into()));
        }

        if self.repo.get_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        if self.repo.get_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        // The unique constraints still decide concurrent registrations.
        let user = self
            .repo
            .create(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password::hash_password(password)?,
                role,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Returns a signed access token. Unknown users and wrong passwords are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<String> {
        let Some(credentials) = self.repo.get_credentials(username).await? else {
            password::verify_absent_user(password);
            tracing::info!("Login failed");
            return Err(AppError::InvalidCredentials);
        };

        if !password::verify_password(password, &credentials.password_hash) {
            tracing::info!(user_id = credentials.profile.id, "Login failed");
            return Err(AppError::InvalidCredentials);
        }

        let profile = credentials.profile;
        jwt::issue(
            profile.id,
            profile.role,
            &profile.username,
            &self.jwt_secret,
            self.access_token_ttl,
        )
    }

    /// Checks a bearer token and loads the user it names. A user deleted after the token was
    /// issued is `NotFound`, not unauthorized.
    pub async fn resolve_caller(&self, token: &str) -> AppResult<Caller> {
        let identity: TokenIdentity = jwt::verify(token, &self.jwt_secret)?;
        let profile = self
            .repo
            .get_by_id(identity.user_id)
            .await?
            .ok_or_else(AppError::user_not_found)?;
        Ok(Caller::from(&profile))
    }

    pub async fn get_self(&self, caller: &Caller) -> AppResult<UserProfile> {
        self.repo
            .get_by_id(caller.id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64, caller: &Caller) -> AppResult<UserProfile> {
        caller.require_self_or_admin(id)?;
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, caller: &Caller) -> AppResult<Vec<UserProfile>> {
        if !caller.is_admin() {
            return Err(AppError::Forbidden(
                "Unauthorized. Admin privileges required.".into(),
            ));
        }
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, caller: &Caller) -> AppResult<()> {
        caller.require_admin()?;

        if id == PRIMARY_ADMIN_ID {
            return Err(AppError::Forbidden("Cannot delete main admin user".into()));
        }

        if !self.repo.delete_with_subscriptions(id).await? {
            return Err(AppError::user_not_found());
        }

        tracing::warn!(user_id = id, deleted_by = caller.id, "User deleted");
        Ok(())
    }

    /// Only the role is mutable here; a request without a role returns the profile unchanged.
    #[instrument(skip(self))]
    pub async fn update_role(
        &self,
        id: i64,
        role: Option<UserRole>,
        caller: &Caller,
    ) -> AppResult<UserProfile> {
        caller.require_admin()?;

        let updated = match role {
            Some(role) => self.repo.update_role(id, role).await?,
            None => self.repo.get_by_id(id).await?,
        };
        let updated = updated.ok_or_else(AppError::user_not_found)?;

        if let Some(role) = role {
            tracing::info!(user_id = id, role = %role, changed_by = caller.id, "User role updated");
        }
        Ok(updated)
    }

    /// Creates the primary administrator unless a user with that username exists.
    /// Returns whether an account was created.
    #[instrument(skip(self, password))]
    pub async fn ensure_primary_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<bool> {
        if self.repo.get_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let admin = self
            .repo
            .create(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password::hash_password(password)?,
                role: UserRole::Admin,
            })
            .await?;

        tracing::info!(user_id = admin.id, "Primary administrator seeded");
        Ok(true)
    }
}
