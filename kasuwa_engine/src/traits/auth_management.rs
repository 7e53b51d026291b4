use thiserror::Error;

use crate::db_types::Role;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User not found")]
    UserNotFound,
    #[error("User is missing {0} required role(s)")]
    RoleNotAllowed(usize),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    async fn fetch_roles_for_user(&self, user_id: i64) -> Result<Vec<Role>, AuthApiError>;

    /// Errors with [`AuthApiError::RoleNotAllowed`] if the user does not hold every given role.
    async fn check_user_has_roles(&self, user_id: i64, roles: &[Role]) -> Result<(), AuthApiError>;

    async fn assign_roles(&self, user_id: i64, roles: &[Role]) -> Result<(), AuthApiError>;

    /// Returns the number of roles actually removed.
    async fn remove_roles(&self, user_id: i64, roles: &[Role]) -> Result<u64, AuthApiError>;
}
