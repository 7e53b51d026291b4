//! Request and response payloads for the REST endpoints.
use kasuwa_engine::db_types::{NewOrderItem, Role, ShippingMethod, VendorStatus};
use ksw_common::Kobo;
use serde::{Deserialize, Serialize};

/// The generic "did it work" response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { success: false, message: message.into() }
    }
}

//----------------------------------------------   Accounts   ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterVendorRequest {
    pub business_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorStatusRequest {
    pub status: VendorStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdateRequest {
    pub user_id: i64,
    #[serde(default)]
    pub apply: Vec<Role>,
    #[serde(default)]
    pub revoke: Vec<Role>,
}

//----------------------------------------------   Catalog   ----------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct NewProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: Kobo,
    pub download_limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductStatusRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub product_id: i64,
    pub order_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

//----------------------------------------------   Orders   -----------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct CartAddRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Checkout either names explicit line items, or (when `items` is absent) converts the
/// authenticated user's cart into an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Option<Vec<NewOrderItem>>,
    pub shipping_method: ShippingMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

/// The client may supply its own idempotency key so that a retried "pay" click cannot create
/// a second pending payment. A fresh key is generated when it is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitiatePaymentRequest {
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    /// When true, only unread notifications are returned.
    #[serde(default)]
    pub unread: bool,
}

//----------------------------------------------   Wallet   -----------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: Kobo,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

/// Admin settlement instruction for a pending withdrawal. `success: false` requires a reason,
/// which is recorded against the withdrawal and shown to the vendor.
#[derive(Debug, Clone, Deserialize)]
pub struct SettleWithdrawalRequest {
    pub success: bool,
    pub reason: Option<String>,
}
