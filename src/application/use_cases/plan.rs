use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{authorization::Caller, validators},
};

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<PlanProfile>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<PlanProfile>>;
    async fn get_by_name(&self, name: &str) -> AppResult<Option<PlanProfile>>;
    /// Plans in insertion order. Inactive plans are skipped unless `include_inactive`.
    async fn list(&self, include_inactive: bool) -> AppResult<Vec<PlanProfile>>;
    /// Applies only the fields present in `input`. `None` if the plan does not exist.
    async fn update(&self, id: i64, input: &UpdatePlanInput) -> AppResult<Option<PlanProfile>>;
    async fn delete(&self, id: i64) -> AppResult<bool>;
    async fn has_subscriptions(&self, id: i64) -> AppResult<bool>;
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlanProfile {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub features: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Public catalogue entry: the active flag is not shown.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPlan {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub features: String,
}

impl From<PlanProfile> for PublicPlan {
    fn from(plan: PlanProfile) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            price: plan.price,
            duration_days: plan.duration_days,
            features: plan.features,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    #[serde(default)]
    pub features: Option<String>,
}

/// PUT and PATCH share this shape; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlanInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration_days: Option<i32>,
    pub features: Option<String>,
    pub is_active: Option<bool>,
}

fn plan_name_invalid() -> AppError {
    AppError::InvalidInput(format!(
        "Plan name must be 1-{} characters",
        validators::MAX_PLAN_NAME_LEN
    ))
}

fn duplicate_plan_name() -> AppError {
    AppError::Conflict("A plan with this name already exists".into())
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PlanUseCases {
    repo: Arc<dyn PlanRepo>,
}

impl PlanUseCases {
    pub fn new(repo: Arc<dyn PlanRepo>) -> Self {
        Self { repo }
    }

    /// Catalogue visible without authentication.
    pub async fn list_active(&self) -> AppResult<Vec<PublicPlan>> {
        let plans = self.repo.list(false).await?;
        Ok(plans.into_iter().map(PublicPlan::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self, caller: &Caller) -> AppResult<Vec<PlanProfile>> {
        caller.require_admin()?;
        self.repo.list(true).await
    }

    pub async fn get(&self, id: i64) -> AppResult<PlanProfile> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(AppError::plan_not_found)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        mut input: CreatePlanInput,
        caller: &Caller,
    ) -> AppResult<PlanProfile> {
        caller.require_admin()?;

        input.name = input.name.trim().to_string();
        if !validators::is_valid_plan_name(&input.name) {
            return Err(plan_name_invalid());
        }
        validators::validate_price(input.price)?;
        validators::validate_duration_days(input.duration_days)?;

        if self.repo.get_by_name(&input.name).await?.is_some() {
            return Err(duplicate_plan_name());
        }

        let input = CreatePlanInput {
            description: Some(input.description.unwrap_or_default()),
            features: Some(input.features.unwrap_or_default()),
            ..input
        };
        let plan = self.repo.create(&input).await?;

        tracing::info!(plan_id = plan.id, created_by = caller.id, "Plan created");
        Ok(plan)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i64,
        mut input: UpdatePlanInput,
        caller: &Caller,
    ) -> AppResult<PlanProfile> {
        caller.require_admin()?;

        let existing = self.get(id).await?;

        if let Some(name) = input.name.as_mut() {
            *name = name.trim().to_string();
            if !validators::is_valid_plan_name(name) {
                return Err(plan_name_invalid());
            }
            if *name != existing.name {
                let taken = self.repo.get_by_name(name).await?;
                if taken.is_some_and(|other| other.id != id) {
                    return Err(duplicate_plan_name());
                }
            }
        }
        if let Some(price) = input.price {
            validators::validate_price(price)?;
        }
        if let Some(duration_days) = input.duration_days {
            validators::validate_duration_days(duration_days)?;
        }

        let plan = self
            .repo
            .update(id, &input)
            .await?
            .ok_or_else(AppError::plan_not_found)?;

        tracing::info!(plan_id = plan.id, updated_by = caller.id, "Plan updated");
        Ok(plan)
    }

    /// Plans that still have subscriptions cannot be removed; they are retired with
    /// `is_active = false` instead.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, caller: &Caller) -> AppResult<()> {
        caller.require_admin()?;

        self.get(id).await?;
        if self.repo.has_subscriptions(id).await? {
            return Err(AppError::Conflict(
                "Plan has subscriptions; deactivate it instead".into(),
            ));
        }
        if !self.repo.delete(id).await? {
            return Err(AppError::plan_not_found());
        }

        tracing::warn!(plan_id = id, deleted_by = caller.id, "Plan deleted");
        Ok(())
    }
}
