//! Test data factories.
//!
//! Each factory returns a complete, valid object. Ids are placeholders; the in-memory store
//! assigns real ones on insert. Use the closure parameter to override specific fields.

use chrono::{Duration, NaiveDateTime, Utc};

use crate::{
    application::use_cases::{
        plan::PlanProfile, subscription::SubscriptionProfile, user::UserProfile,
    },
    domain::entities::user_role::UserRole,
};

/// Create a test user with sensible defaults. The email is derived from the username
/// after overrides unless the override set one explicitly.
pub fn create_test_user(overrides: impl FnOnce(&mut UserProfile)) -> UserProfile {
    let mut user = UserProfile {
        id: 0,
        username: "testuser".to_string(),
        email: String::new(),
        role: UserRole::User,
        created_at: test_datetime(),
    };
    overrides(&mut user);
    if user.email.is_empty() {
        user.email = format!("{}@example.com", user.username);
    }
    user
}

/// Create a test plan with sensible defaults.
pub fn create_test_plan(overrides: impl FnOnce(&mut PlanProfile)) -> PlanProfile {
    let mut plan = PlanProfile {
        id: 0,
        name: "Basic".to_string(),
        description: Some("Entry tier".to_string()),
        price: 4.99,
        duration_days: 30,
        features: "Feature 1, Feature 2".to_string(),
        is_active: true,
        created_at: test_datetime(),
    };
    overrides(&mut plan);
    plan
}

/// Create a subscription that started now and runs for 30 days.
pub fn create_test_subscription(
    user_id: i64,
    plan_id: i64,
    overrides: impl FnOnce(&mut SubscriptionProfile),
) -> SubscriptionProfile {
    let now = Utc::now().naive_utc();
    let mut subscription = SubscriptionProfile {
        id: 0,
        user_id,
        plan_id,
        start_date: now,
        end_date: now + Duration::days(30),
        is_active: true,
        created_at: now,
    };
    overrides(&mut subscription);
    subscription
}

/// Fixed datetime for deterministic fixtures.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_email_follows_username_unless_overridden() {
        let alice = create_test_user(|u| u.username = "alice".into());
        assert_eq!(alice.email, "alice@example.com");

        let bob = create_test_user(|u| u.email = "b@x.com".into());
        assert_eq!(bob.email, "b@x.com");
    }

    #[test]
    fn default_subscription_is_currently_active() {
        let sub = create_test_subscription(1, 2, |_| {});
        assert!(
            sub.period()
                .is_effectively_active(sub.is_active, Utc::now().naive_utc())
        );
    }
}
