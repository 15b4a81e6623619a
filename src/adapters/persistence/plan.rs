use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::plan::{CreatePlanInput, PlanProfile, PlanRepo, UpdatePlanInput},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> PlanProfile {
    PlanProfile {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        duration_days: row.get("duration_days"),
        features: row.get("features"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str =
    "id, name, description, price, duration_days, features, is_active, created_at";

#[async_trait]
impl PlanRepo for PostgresPersistence {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<PlanProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO plans (name, description, price, duration_days, features)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration_days)
        .bind(input.features.as_deref().unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<PlanProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM plans WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Option<PlanProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM plans WHERE name = $1", SELECT_COLS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<PlanProfile>> {
        let query = if include_inactive {
            format!("SELECT {} FROM plans ORDER BY id", SELECT_COLS)
        } else {
            format!(
                "SELECT {} FROM plans WHERE is_active = true ORDER BY id",
                SELECT_COLS
            )
        };
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    async fn update(&self, id: i64, input: &UpdatePlanInput) -> AppResult<Option<PlanProfile>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                duration_days = COALESCE($5, duration_days),
                features = COALESCE($6, features),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration_days)
        .bind(&input.features)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        // A referencing subscription trips the RESTRICT foreign key and maps to Conflict.
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn has_subscriptions(&self, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM subscriptions WHERE plan_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(exists)
    }
}
