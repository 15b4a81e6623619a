//! In-memory implementation of every repository trait.
//!
//! One store backs users, plans and subscriptions so joins and cascades behave like the
//! Postgres adapter. Rows live in `BTreeMap`s keyed by id, which keeps insertion order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        password,
        use_cases::{
            plan::{CreatePlanInput, PlanProfile, PlanRepo, UpdatePlanInput},
            subscription::{
                NewSubscription, SubscriptionDetails, SubscriptionProfile, SubscriptionRepo,
            },
            user::{NewUser, UserCredentials, UserProfile, UserRepo},
        },
    },
    domain::entities::{subscription::CancelOutcome, user_role::UserRole},
};

#[derive(Default)]
struct StoreState {
    users: BTreeMap<i64, UserCredentials>,
    plans: BTreeMap<i64, PlanProfile>,
    subscriptions: BTreeMap<i64, SubscriptionProfile>,
    next_user_id: i64,
    next_plan_id: i64,
    next_subscription_id: i64,
}

impl StoreState {
    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn details(&self, sub: &SubscriptionProfile) -> SubscriptionDetails {
        SubscriptionDetails {
            subscription: sub.clone(),
            username: self
                .users
                .get(&sub.user_id)
                .map(|u| u.profile.username.clone())
                .unwrap_or_default(),
            plan_name: self
                .plans
                .get(&sub.plan_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with an unusable credential; the assigned id is returned in the profile.
    pub fn insert_user(&self, user: UserProfile) -> UserProfile {
        self.insert_user_row(user, String::new())
    }

    /// Inserts a user who can log in with `password`.
    pub fn insert_user_with_password(&self, user: UserProfile, password: &str) -> UserProfile {
        let hash = password::hash_password(password).unwrap();
        self.insert_user_row(user, hash)
    }

    fn insert_user_row(&self, mut user: UserProfile, password_hash: String) -> UserProfile {
        let mut state = self.state.lock().unwrap();
        user.id = StoreState::allocate(&mut state.next_user_id);
        state.users.insert(
            user.id,
            UserCredentials {
                profile: user.clone(),
                password_hash,
            },
        );
        user
    }

    pub fn insert_plan(&self, mut plan: PlanProfile) -> PlanProfile {
        let mut state = self.state.lock().unwrap();
        plan.id = StoreState::allocate(&mut state.next_plan_id);
        state.plans.insert(plan.id, plan.clone());
        plan
    }

    pub fn insert_subscription(&self, mut sub: SubscriptionProfile) -> SubscriptionProfile {
        let mut state = self.state.lock().unwrap();
        sub.id = StoreState::allocate(&mut state.next_subscription_id);
        state.subscriptions.insert(sub.id, sub.clone());
        sub
    }

    pub fn subscriptions_of(&self, user_id: i64) -> Vec<SubscriptionProfile> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn subscription(&self, id: i64) -> Option<SubscriptionProfile> {
        self.state.lock().unwrap().subscriptions.get(&id).cloned()
    }
}

fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// ============================================================================
// UserRepo
// ============================================================================

#[async_trait]
impl UserRepo for InMemoryStore {
    async fn create(&self, user: &NewUser) -> AppResult<UserProfile> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.profile.username == user.username) {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        if state.users.values().any(|u| u.profile.email == user.email) {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        let profile = UserProfile {
            id: StoreState::allocate(&mut state.next_user_id),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: now_utc(),
        };
        state.users.insert(
            profile.id,
            UserCredentials {
                profile: profile.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(profile)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<UserProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.get(&id).map(|u| u.profile.clone()))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<UserProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.profile.username == username)
            .map(|u| u.profile.clone()))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.profile.email == email)
            .map(|u| u.profile.clone()))
    }

    async fn get_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.profile.username == username)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<UserProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().map(|u| u.profile.clone()).collect())
    }

    async fn update_role(&self, id: i64, role: UserRole) -> AppResult<Option<UserProfile>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.users.get_mut(&id).map(|u| {
            u.profile.role = role;
            u.profile.clone()
        }))
    }

    async fn delete_with_subscriptions(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.subscriptions.retain(|_, s| s.user_id != id);
        Ok(state.users.remove(&id).is_some())
    }
}

// ============================================================================
// PlanRepo
// ============================================================================

#[async_trait]
impl PlanRepo for InMemoryStore {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<PlanProfile> {
        let mut state = self.state.lock().unwrap();
        if state.plans.values().any(|p| p.name == input.name) {
            return Err(AppError::Conflict(
                "A plan with this name already exists".into(),
            ));
        }

        let plan = PlanProfile {
            id: StoreState::allocate(&mut state.next_plan_id),
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            duration_days: input.duration_days,
            features: input.features.clone().unwrap_or_default(),
            is_active: true,
            created_at: now_utc(),
        };
        state.plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<PlanProfile>> {
        Ok(self.state.lock().unwrap().plans.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Option<PlanProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state.plans.values().find(|p| p.name == name).cloned())
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<PlanProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .plans
            .values()
            .filter(|p| include_inactive || p.is_active)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, input: &UpdatePlanInput) -> AppResult<Option<PlanProfile>> {
        let mut state = self.state.lock().unwrap();
        if let Some(name) = &input.name {
            if state.plans.values().any(|p| p.id != id && &p.name == name) {
                return Err(AppError::Conflict(
                    "A plan with this name already exists".into(),
                ));
            }
        }

        let Some(plan) = state.plans.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            plan.name = name.clone();
        }
        if let Some(description) = &input.description {
            plan.description = Some(description.clone());
        }
        if let Some(price) = input.price {
            plan.price = price;
        }
        if let Some(duration_days) = input.duration_days {
            plan.duration_days = duration_days;
        }
        if let Some(features) = &input.features {
            plan.features = features.clone();
        }
        if let Some(is_active) = input.is_active {
            plan.is_active = is_active;
        }
        Ok(Some(plan.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.subscriptions.values().any(|s| s.plan_id == id) {
            return Err(AppError::Conflict(
                "Plan has subscriptions; deactivate it instead".into(),
            ));
        }
        Ok(state.plans.remove(&id).is_some())
    }

    async fn has_subscriptions(&self, id: i64) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.subscriptions.values().any(|s| s.plan_id == id))
    }
}

// ============================================================================
// SubscriptionRepo
// ============================================================================

#[async_trait]
impl SubscriptionRepo for InMemoryStore {
    async fn create_unless_active(
        &self,
        input: &NewSubscription,
        now: NaiveDateTime,
    ) -> AppResult<Option<SubscriptionDetails>> {
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&input.user_id) {
            return Err(AppError::user_not_found());
        }
        if !state.plans.contains_key(&input.plan_id) {
            return Err(AppError::plan_not_found());
        }

        let already_active = state.subscriptions.values().any(|s| {
            s.user_id == input.user_id
                && s.plan_id == input.plan_id
                && s.period().is_effectively_active(s.is_active, now)
        });
        if already_active {
            return Ok(None);
        }

        let sub = SubscriptionProfile {
            id: StoreState::allocate(&mut state.next_subscription_id),
            user_id: input.user_id,
            plan_id: input.plan_id,
            start_date: input.period.start_date,
            end_date: input.period.end_date,
            is_active: true,
            created_at: now,
        };
        state.subscriptions.insert(sub.id, sub.clone());
        Ok(Some(state.details(&sub)))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<SubscriptionProfile>> {
        Ok(self.subscription(id))
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<SubscriptionDetails>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| state.details(s))
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<SubscriptionDetails>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subscriptions
            .values()
            .map(|s| state.details(s))
            .collect())
    }

    async fn cancel_or_delete(&self, id: i64) -> AppResult<Option<CancelOutcome>> {
        let mut state = self.state.lock().unwrap();
        let Some(sub) = state.subscriptions.get_mut(&id) else {
            return Ok(None);
        };

        let outcome = CancelOutcome::for_active_flag(sub.is_active);
        match outcome {
            CancelOutcome::Canceled => sub.is_active = false,
            CancelOutcome::Deleted => {
                state.subscriptions.remove(&id);
            }
        }
        Ok(Some(outcome))
    }
}
