use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, NewVendor, RoleList, User, Vendor, VendorStatus},
    traits::AccountApiError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, AccountApiError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO users (email, display_name, password_hash, roles)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user.email.clone())
    .bind(user.display_name)
    .bind(user.password_hash)
    .bind(user.roles)
    .fetch_one(conn)
    .await;
    match result {
        Ok(user) => Ok(user),
        Err(e) if super::is_unique_violation(&e, "users.email") => Err(AccountApiError::DuplicateEmail(user.email)),
        Err(e) => Err(e.into()),
    }
}

pub async fn user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await
}

pub async fn set_roles(user_id: i64, roles: &RoleList, conn: &mut SqliteConnection) -> Result<User, AccountApiError> {
    let user: Option<User> =
        sqlx::query_as("UPDATE users SET roles = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(roles.clone())
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    user.ok_or(AccountApiError::UserNotFound(user_id))
}

pub async fn insert_vendor(vendor: NewVendor, conn: &mut SqliteConnection) -> Result<Vendor, AccountApiError> {
    let result: Result<Vendor, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO vendors (user_id, business_name)
            VALUES ($1, $2)
            RETURNING *;
        "#,
    )
    .bind(vendor.user_id)
    .bind(vendor.business_name)
    .fetch_one(conn)
    .await;
    match result {
        Ok(vendor) => {
            debug!("🗃️ Vendor registered for user {}", vendor.user_id);
            Ok(vendor)
        },
        Err(e) if super::is_unique_violation(&e, "vendors.user_id") => {
            Err(AccountApiError::VendorAlreadyRegistered(vendor.user_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn vendor_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Vendor>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vendors WHERE user_id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn vendor_by_id(vendor_id: i64, conn: &mut SqliteConnection) -> Result<Option<Vendor>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vendors WHERE id = $1").bind(vendor_id).fetch_optional(conn).await
}

pub async fn set_vendor_status(
    vendor_id: i64,
    status: VendorStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Vendor>, sqlx::Error> {
    sqlx::query_as("UPDATE vendors SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
        .bind(status.to_string())
        .bind(vendor_id)
        .fetch_optional(conn)
        .await
}
