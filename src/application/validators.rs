use validator::ValidateEmail;

use crate::app_error::{AppError, AppResult};

pub const MAX_USERNAME_LEN: usize = 80;
pub const MAX_EMAIL_LEN: usize = 120;
pub const MAX_PLAN_NAME_LEN: usize = 100;
/// Longest plan a subscription may be bought for: one hundred years.
pub const MAX_DURATION_DAYS: i32 = 36_500;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.len() <= MAX_EMAIL_LEN && email.validate_email()
}

pub fn is_valid_username(username: &str) -> bool {
    let username = username.trim();
    !username.is_empty() && username.chars().count() <= MAX_USERNAME_LEN
}

pub fn is_valid_plan_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name.chars().count() <= MAX_PLAN_NAME_LEN
}

pub fn validate_price(price: f64) -> AppResult<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "Price must be a non-negative number".into(),
        ))
    }
}

pub fn validate_duration_days(duration_days: i32) -> AppResult<()> {
    if duration_days < 1 {
        return Err(AppError::InvalidInput(
            "Duration must be at least one day".into(),
        ));
    }
    if duration_days > MAX_DURATION_DAYS {
        return Err(AppError::InvalidInput(format!(
            "Duration must be at most {} days",
            MAX_DURATION_DAYS
        )));
    }
    Ok(())
}
