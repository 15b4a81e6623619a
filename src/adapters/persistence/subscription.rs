use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::subscription::CancelOutcome,
    use_cases::subscription::{
        NewSubscription, SubscriptionDetails, SubscriptionProfile, SubscriptionRepo,
    },
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> SubscriptionProfile {
    SubscriptionProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

fn row_to_details(row: sqlx::postgres::PgRow) -> SubscriptionDetails {
    SubscriptionDetails {
        subscription: row_to_profile(&row),
        username: row.get("username"),
        plan_name: row.get("plan_name"),
    }
}

const SELECT_COLS: &str = "id, user_id, plan_id, start_date, end_date, is_active, created_at";

// Plan and owner are joined up front so listings never issue per-row lookups.
const SELECT_DETAILS: &str = r#"
    SELECT s.id, s.user_id, s.plan_id, s.start_date, s.end_date, s.is_active, s.created_at,
           u.username, p.name AS plan_name
    FROM subscriptions s
    JOIN users u ON u.id = s.user_id
    JOIN plans p ON p.id = s.plan_id
"#;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn create_unless_active(
        &self,
        input: &NewSubscription,
        now: NaiveDateTime,
    ) -> AppResult<Option<SubscriptionDetails>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Serializes concurrent subscribe calls by the same user.
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(input.user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::from)?;
        if locked.is_none() {
            return Err(AppError::user_not_found());
        }

        // Holds off a concurrent plan delete until the insert commits.
        let plan: Option<i64> = sqlx::query_scalar("SELECT id FROM plans WHERE id = $1 FOR SHARE")
            .bind(input.plan_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::from)?;
        if plan.is_none() {
            return Err(AppError::plan_not_found());
        }

        let already_active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions
                WHERE user_id = $1 AND plan_id = $2 AND is_active = true AND end_date >= $3
            )
            "#,
        )
        .bind(input.user_id)
        .bind(input.plan_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;
        if already_active {
            return Ok(None);
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions
                (user_id, plan_id, start_date, end_date, is_active, created_at)
            VALUES ($1, $2, $3, $4, true, $5)
            RETURNING id
            "#,
        )
        .bind(input.user_id)
        .bind(input.plan_id)
        .bind(input.period.start_date)
        .bind(input.period.end_date)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let row = sqlx::query(&format!("{} WHERE s.id = $1", SELECT_DETAILS))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(Some(row_to_details(row)))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<SubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<SubscriptionDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE s.user_id = $1 ORDER BY s.id",
            SELECT_DETAILS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_details).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<SubscriptionDetails>> {
        let rows = sqlx::query(&format!("{} ORDER BY s.id", SELECT_DETAILS))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_details).collect())
    }

    async fn cancel_or_delete(&self, id: i64) -> AppResult<Option<CancelOutcome>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM subscriptions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::from)?;
        let Some(active) = active else {
            return Ok(None);
        };

        let outcome = CancelOutcome::for_active_flag(active);
        let statement = match outcome {
            CancelOutcome::Canceled => "UPDATE subscriptions SET is_active = false WHERE id = $1",
            CancelOutcome::Deleted => "DELETE FROM subscriptions WHERE id = $1",
        };
        sqlx::query(statement)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(Some(outcome))
    }
}
