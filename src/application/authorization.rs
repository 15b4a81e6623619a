use crate::{
    app_error::{AppError, AppResult},
    domain::entities::user_role::UserRole,
};

/// The authenticated user behind a request, as loaded from the store (not from token claims).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(caller_id = self.id, "Admin-only operation denied");
            Err(AppError::forbidden())
        }
    }

    /// Admins may act on anything; everyone else only on resources they own.
    pub fn require_self_or_admin(&self, owner_id: i64) -> AppResult<()> {
        if self.is_admin() || self.id == owner_id {
            Ok(())
        } else {
            tracing::warn!(caller_id = self.id, owner_id, "Ownership check denied");
            Err(AppError::forbidden())
        }
    }
}
