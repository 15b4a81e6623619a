use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{authorization::Caller, use_cases::plan::PlanRepo},
    domain::entities::subscription::{CancelOutcome, SubscriptionPeriod},
};

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Inserts the subscription unless the user already holds one for the same plan that is
    /// flagged active and not expired at `now`. Check and insert are one atomic step.
    async fn create_unless_active(
        &self,
        input: &NewSubscription,
        now: NaiveDateTime,
    ) -> AppResult<Option<SubscriptionDetails>>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<SubscriptionProfile>>;
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<SubscriptionDetails>>;
    async fn list_all(&self) -> AppResult<Vec<SubscriptionDetails>>;
    /// Active rows are soft-canceled, inactive rows deleted. `None` if the row is gone.
    async fn cancel_or_delete(&self, id: i64) -> AppResult<Option<CancelOutcome>>;
}

#[derive(Debug, Clone)]
pub struct SubscriptionProfile {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl SubscriptionProfile {
    pub fn period(&self) -> SubscriptionPeriod {
        SubscriptionPeriod {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// A subscription joined with its owner's username and its plan's name.
#[derive(Debug, Clone)]
pub struct SubscriptionDetails {
    pub subscription: SubscriptionProfile,
    pub username: String,
    pub plan_name: String,
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: i64,
    pub plan_id: i64,
    pub period: SubscriptionPeriod,
}

/// What a subscriber sees. `is_active` is the effective status, not the stored flag.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub id: i64,
    pub plan_id: i64,
    pub plan_name: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub is_active: bool,
}

impl SubscriptionView {
    fn at(details: SubscriptionDetails, now: NaiveDateTime) -> Self {
        let sub = details.subscription;
        Self {
            id: sub.id,
            plan_id: sub.plan_id,
            is_active: sub.period().is_effectively_active(sub.is_active, now),
            plan_name: details.plan_name,
            start_date: sub.start_date,
            end_date: sub.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSubscriptionView {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub plan_id: i64,
    pub plan_name: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub is_active: bool,
}

impl AdminSubscriptionView {
    fn at(details: SubscriptionDetails, now: NaiveDateTime) -> Self {
        let sub = details.subscription;
        Self {
            id: sub.id,
            user_id: sub.user_id,
            username: details.username,
            plan_id: sub.plan_id,
            plan_name: details.plan_name,
            is_active: sub.period().is_effectively_active(sub.is_active, now),
            start_date: sub.start_date,
            end_date: sub.end_date,
        }
    }
}

fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
    plans: Arc<dyn PlanRepo>,
}

impl SubscriptionUseCases {
    pub fn new(repo: Arc<dyn SubscriptionRepo>, plans: Arc<dyn PlanRepo>) -> Self {
        Self { repo, plans }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, plan_id: i64, caller: &Caller) -> AppResult<SubscriptionView> {
        let plan = self
            .plans
            .get_by_id(plan_id)
            .await?
            .ok_or_else(AppError::plan_not_found)?;

        let now = now_utc();
        let period = SubscriptionPeriod::starting_at(now, plan.duration_days).ok_or_else(|| {
            AppError::InvalidInput("Plan duration is out of range".into())
        })?;
        let input = NewSubscription {
            user_id: caller.id,
            plan_id: plan.id,
            period,
        };

        let Some(created) = self.repo.create_unless_active(&input, now).await? else {
            return Err(AppError::InvalidInput(
                "You already have an active subscription to this plan".into(),
            ));
        };

        tracing::info!(
            subscription_id = created.subscription.id,
            user_id = caller.id,
            plan_id,
            "Subscription created"
        );
        Ok(SubscriptionView::at(created, now))
    }

    pub async fn list_mine(&self, caller: &Caller) -> AppResult<Vec<SubscriptionView>> {
        let now = now_utc();
        let subs = self.repo.list_for_user(caller.id).await?;
        Ok(subs
            .into_iter()
            .map(|details| SubscriptionView::at(details, now))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self, caller: &Caller) -> AppResult<Vec<AdminSubscriptionView>> {
        caller.require_admin()?;

        let now = now_utc();
        let subs = self.repo.list_all().await?;
        Ok(subs
            .into_iter()
            .map(|details| AdminSubscriptionView::at(details, now))
            .collect())
    }

    /// Ownership is checked against the stored owner of the subscription.
    #[instrument(skip(self))]
    pub async fn cancel_or_delete(&self, id: i64, caller: &Caller) -> AppResult<CancelOutcome> {
        let subscription = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(AppError::subscription_not_found)?;

        caller.require_self_or_admin(subscription.user_id)?;

        let outcome = self
            .repo
            .cancel_or_delete(id)
            .await?
            .ok_or_else(AppError::subscription_not_found)?;

        tracing::info!(
            subscription_id = id,
            owner_id = subscription.user_id,
            caller_id = caller.id,
            outcome = ?outcome,
            "Subscription cancel requested"
        );
        Ok(outcome)
    }
}
