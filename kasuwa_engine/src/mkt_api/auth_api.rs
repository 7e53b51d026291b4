use crate::{
    db_types::Role,
    traits::{AuthApiError, AuthManagement},
};

/// Role queries and admin role management.
#[derive(Debug, Clone)]
pub struct AuthApi<B> {
    db: B,
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn roles_for_user(&self, user_id: i64) -> Result<Vec<Role>, AuthApiError> {
        self.db.fetch_roles_for_user(user_id).await
    }

    pub async fn check_roles(&self, user_id: i64, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.check_user_has_roles(user_id, roles).await
    }

    pub async fn assign_roles(&self, user_id: i64, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.assign_roles(user_id, roles).await
    }

    pub async fn remove_roles(&self, user_id: i64, roles: &[Role]) -> Result<u64, AuthApiError> {
        self.db.remove_roles(user_id, roles).await
    }
}
