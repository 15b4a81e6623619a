use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::user_role::UserRole,
    use_cases::user::{NewUser, UserCredentials, UserProfile, UserRepo},
};

// User row as stored in the db.
#[derive(sqlx::FromRow, Debug)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: UserRole,
    created_at: NaiveDateTime,
}

impl UserRow {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username,
            email: self.email,
            role: self.role,
            created_at: self.created_at,
        }
    }

    fn into_credentials(self) -> UserCredentials {
        let password_hash = self.password_hash.clone();
        UserCredentials {
            profile: self.into_profile(),
            password_hash,
        }
    }
}

const SELECT_COLS: &str = "id, username, email, password_hash, role, created_at";

impl PostgresPersistence {
    /// `column` is one of the unique text columns, never user input.
    async fn fetch_user_by(&self, column: &str, value: &str) -> AppResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {} = $1",
            SELECT_COLS, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)
    }
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn create(&self, user: &NewUser) -> AppResult<UserProfile> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            SELECT_COLS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.into_profile())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(UserRow::into_profile))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<UserProfile>> {
        let row = self.fetch_user_by("username", username).await?;
        Ok(row.map(UserRow::into_profile))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let row = self.fetch_user_by("email", email).await?;
        Ok(row.map(UserRow::into_profile))
    }

    async fn get_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let row = self.fetch_user_by("username", username).await?;
        Ok(row.map(UserRow::into_credentials))
    }

    async fn list(&self) -> AppResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(UserRow::into_profile).collect())
    }

    async fn update_role(&self, id: i64, role: UserRole) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {}",
            SELECT_COLS
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(UserRow::into_profile))
    }

    async fn delete_with_subscriptions(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        sqlx::query("DELETE FROM subscriptions WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?
            .rows_affected();

        tx.commit().await.map_err(AppError::from)?;
        Ok(deleted > 0)
    }
}
