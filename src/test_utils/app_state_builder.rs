//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` wires the real use cases over one `InMemoryStore`. The primary
//! administrator (id 1, `admin` / `admin123`) is always seeded first.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt,
        use_cases::{
            plan::{PlanProfile, PlanUseCases},
            subscription::{SubscriptionProfile, SubscriptionUseCases},
            user::{UserProfile, UserUseCases},
        },
    },
    domain::entities::user_role::UserRole,
    infra::config::{AdminSeed, AppConfig},
    test_utils::{InMemoryStore, create_test_user},
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_ADMIN_PASSWORD: &str = "admin123";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::new("postgres://unused".into()),
        database_max_connections: 1,
        jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        access_token_ttl: Duration::hours(24),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        admin: AdminSeed {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: SecretString::new(TEST_ADMIN_PASSWORD.into()),
        },
        log_file: None,
    }
}

/// Signs an access token for `user` with the test secret.
pub fn bearer_for(user: &UserProfile) -> String {
    let token = jwt::issue(
        user.id,
        user.role,
        &user.username,
        &SecretString::new(TEST_JWT_SECRET.into()),
        Duration::hours(1),
    )
    .unwrap();
    format!("Bearer {token}")
}

/// Fixtures inserted by the builder, with store-assigned ids.
pub struct TestFixtures {
    pub store: Arc<InMemoryStore>,
    pub admin: UserProfile,
    pub users: Vec<UserProfile>,
    pub plans: Vec<PlanProfile>,
    pub subscriptions: Vec<SubscriptionProfile>,
}

/// Builder for creating `AppState` with in-memory persistence for testing.
///
/// # Example
///
/// ```ignore
/// let (app_state, fixtures) = TestAppStateBuilder::new()
///     .with_user(create_test_user(|u| u.username = "alice".into()), "pw1")
///     .with_plan(create_test_plan(|p| p.name = "Pro".into()))
///     .build();
/// ```
pub struct TestAppStateBuilder {
    users: Vec<(UserProfile, String)>,
    plans: Vec<PlanProfile>,
    // (user index, plan index, template)
    subscriptions: Vec<(usize, usize, SubscriptionProfile)>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            plans: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: UserProfile, password: &str) -> Self {
        self.users.push((user, password.to_string()));
        self
    }

    pub fn with_plan(mut self, plan: PlanProfile) -> Self {
        self.plans.push(plan);
        self
    }

    /// `user_index` and `plan_index` refer to earlier `with_user` / `with_plan` calls.
    pub fn with_subscription(
        mut self,
        user_index: usize,
        plan_index: usize,
        subscription: SubscriptionProfile,
    ) -> Self {
        self.subscriptions
            .push((user_index, plan_index, subscription));
        self
    }

    pub fn build(self) -> (AppState, TestFixtures) {
        let store = Arc::new(InMemoryStore::new());

        let admin = store.insert_user_with_password(
            create_test_user(|u| {
                u.username = "admin".into();
                u.email = "admin@example.com".into();
                u.role = UserRole::Admin;
            }),
            TEST_ADMIN_PASSWORD,
        );

        let users: Vec<UserProfile> = self
            .users
            .into_iter()
            .map(|(user, password)| store.insert_user_with_password(user, &password))
            .collect();
        let plans: Vec<PlanProfile> = self
            .plans
            .into_iter()
            .map(|plan| store.insert_plan(plan))
            .collect();
        let subscriptions = self
            .subscriptions
            .into_iter()
            .map(|(user_index, plan_index, mut sub)| {
                sub.user_id = users[user_index].id;
                sub.plan_id = plans[plan_index].id;
                store.insert_subscription(sub)
            })
            .collect();

        let config = test_config();
        let user_use_cases = UserUseCases::new(
            store.clone(),
            config.jwt_secret.clone(),
            config.access_token_ttl,
        );
        let plan_use_cases = PlanUseCases::new(store.clone());
        let subscription_use_cases = SubscriptionUseCases::new(store.clone(), store.clone());

        let app_state = AppState {
            config: Arc::new(config),
            user_use_cases: Arc::new(user_use_cases),
            plan_use_cases: Arc::new(plan_use_cases),
            subscription_use_cases: Arc::new(subscription_use_cases),
        };

        (
            app_state,
            TestFixtures {
                store,
                admin,
                users,
                plans,
                subscriptions,
            },
        )
    }
}
