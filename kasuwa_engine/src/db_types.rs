//! Database types for the Kasuwa payment engine.
//!
//! Status enums are stored as TEXT in SQLite (via their `Display` form) and every row type
//! derives [`FromRow`]. Money is always [`Kobo`].
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ksw_common::Kobo;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------      OrderNumber      -------------------------------------------------------
/// The human-readable order number, e.g. `KSW-lvq3n2-8kfz`. Unique per order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Role           -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Vendor,
    Admin,
    SuperAdmin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Vendor => write!(f, "vendor"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      RoleList         -------------------------------------------------------
/// Roles are stored against the user record as a comma-separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct RoleList(String);

impl RoleList {
    pub fn from_roles(roles: &[Role]) -> Self {
        let s = roles.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(",");
        Self(s)
    }

    pub fn roles(&self) -> Vec<Role> {
        self.0
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| {
                s.trim().parse::<Role>().map_err(|e| error!("🧑️ Dropping invalid role in role list. {e}")).ok()
            })
            .collect()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    /// Returns a new list with the given roles added (deduplicated, order preserved).
    pub fn with_granted(&self, roles: &[Role]) -> Self {
        let mut all = self.roles();
        for r in roles {
            if !all.contains(r) {
                all.push(*r);
            }
        }
        Self::from_roles(&all)
    }

    /// Returns a new list with the given roles removed, and the number of roles that were removed.
    pub fn with_revoked(&self, roles: &[Role]) -> (Self, u64) {
        let before = self.roles();
        let after = before.iter().copied().filter(|r| !roles.contains(r)).collect::<Vec<_>>();
        let removed = (before.len() - after.len()) as u64;
        (Self::from_roles(&after), removed)
    }
}

impl Display for RoleList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created. No payment has been initialized.
    Pending,
    /// A payment has been initialized for the order.
    Confirmed,
    Processing,
    Shipped,
    /// Payment succeeded. Since goods are digital, payment success is delivery.
    Delivered,
    /// The order has been cancelled by the buyer or an admin.
    Cancelled,
    /// The payment for this order was refunded.
    Refunded,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Confirmed => write!(f, "Confirmed"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Shipped => write!(f, "Shipped"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
            OrderStatusType::Refunded => write!(f, "Refunded"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//-------------------------------------- OrderPaymentStatus    -------------------------------------------------------
/// The payment summary carried on the order row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderPaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPaymentStatus::Pending => write!(f, "Pending"),
            OrderPaymentStatus::Paid => write!(f, "Paid"),
            OrderPaymentStatus::Failed => write!(f, "Failed"),
            OrderPaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Success => write!(f, "Success"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

//--------------------------------------    VendorStatus       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum VendorStatus {
    Pending,
    Approved,
    Suspended,
}

impl Display for VendorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VendorStatus::Pending => write!(f, "Pending"),
            VendorStatus::Approved => write!(f, "Approved"),
            VendorStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

//--------------------------------------    ProductStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "Active"),
            ProductStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

//--------------------------------------   ShippingMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Standard,
    Express,
    SameDay,
}

impl Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShippingMethod::Standard => write!(f, "Standard"),
            ShippingMethod::Express => write!(f, "Express"),
            ShippingMethod::SameDay => write!(f, "SameDay"),
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" | "standard" => Ok(Self::Standard),
            "Express" | "express" => Ok(Self::Express),
            "SameDay" | "same_day" => Ok(Self::SameDay),
            s => Err(ConversionError(format!("Invalid shipping method: {s}"))),
        }
    }
}

//--------------------------------------  WithdrawalStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalStatus::Pending => write!(f, "Pending"),
            WithdrawalStatus::Success => write!(f, "Success"),
            WithdrawalStatus::Failed => write!(f, "Failed"),
            WithdrawalStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

//--------------------------------------  WalletEntryType      -------------------------------------------------------
/// The type of an append-only wallet ledger entry. The sign convention is: the sum of all
/// entry amounts for a wallet equals its available balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum WalletEntryType {
    /// A vendor's earnings for an order item. Positive.
    OrderEarning,
    /// Funds moved out of the available balance when a withdrawal is requested. Negative.
    WithdrawalHold,
    /// A failed withdrawal's hold returned to the available balance. Positive.
    WithdrawalReversal,
    /// A manual adjustment for a refund. Negative.
    Refund,
}

impl Display for WalletEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletEntryType::OrderEarning => write!(f, "OrderEarning"),
            WalletEntryType::WithdrawalHold => write!(f, "WithdrawalHold"),
            WalletEntryType::WithdrawalReversal => write!(f, "WithdrawalReversal"),
            WalletEntryType::Refund => write!(f, "Refund"),
        }
    }
}

//-------------------------------------- NotificationCategory  -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Order,
    Payment,
    Wallet,
    System,
}

impl Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationCategory::Order => write!(f, "Order"),
            NotificationCategory::Payment => write!(f, "Payment"),
            NotificationCategory::Wallet => write!(f, "Wallet"),
            NotificationCategory::System => write!(f, "System"),
        }
    }
}

//--------------------------------------        User           -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: RoleList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub roles: RoleList,
}

impl NewUser {
    pub fn new<S1: Into<String>, S2: Into<String>, S3: Into<String>>(
        email: S1,
        display_name: S2,
        password_hash: S3,
    ) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            password_hash: password_hash.into(),
            roles: RoleList::from_roles(&[Role::Customer]),
        }
    }

    pub fn with_roles(mut self, roles: &[Role]) -> Self {
        self.roles = RoleList::from_roles(roles);
        self
    }
}

//--------------------------------------       Vendor          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub user_id: i64,
    pub business_name: String,
    pub status: VendorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub user_id: i64,
    pub business_name: String,
}

//--------------------------------------       Product         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub vendor_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Kobo,
    pub status: ProductStatus,
    pub approved: bool,
    pub sold_count: i64,
    pub download_limit: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product may only be placed in an order while it is active and approved.
    pub fn is_purchasable(&self) -> bool {
        self.status == ProductStatus::Active && self.approved
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub vendor_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Kobo,
    pub download_limit: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(vendor_id: i64, title: S, price: Kobo) -> Self {
        Self { vendor_id, title: title.into(), description: None, price, download_limit: 5 }
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub user_id: i64,
    pub subtotal: Kobo,
    pub tax: Kobo,
    pub shipping_fee: Kobo,
    pub total: Kobo,
    pub shipping_method: ShippingMethod,
    pub status: OrderStatusType,
    pub payment_status: OrderPaymentStatus,
    pub payment_reference: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cancellable(&self) -> bool {
        matches!(self.status, OrderStatusType::Pending | OrderStatusType::Confirmed)
    }
}

/// An incoming order. Pricing is calculated by the engine from live product reads, never
/// taken from the client.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub items: Vec<NewOrderItem>,
    pub shipping_method: ShippingMethod,
}

impl NewOrder {
    pub fn new(user_id: i64, items: Vec<NewOrderItem>, shipping_method: ShippingMethod) -> Self {
        Self { user_id, items, shipping_method }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

//--------------------------------------      OrderItem        -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub vendor_id: i64,
    /// The product price at the time the order was placed. Later price changes never affect
    /// existing orders.
    pub unit_price: Kobo,
    pub quantity: i64,
    pub download_count: i64,
    pub download_limit: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> Kobo {
        self.unit_price * self.quantity
    }
}

//--------------------------------------       Payment         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub reference: String,
    pub idempotency_key: String,
    pub amount: Kobo,
    pub status: PaymentStatus,
    pub authorization_url: Option<String>,
    pub channel: Option<String>,
    pub gateway_response: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub refund_reference: Option<String>,
    pub refund_amount: Option<Kobo>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i64,
    pub reference: String,
    pub idempotency_key: String,
    pub amount: Kobo,
    pub authorization_url: Option<String>,
}

//--------------------------------------       Wallet          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    /// Funds the vendor can withdraw. Always equal to the sum of the wallet's ledger entries.
    pub available_balance: Kobo,
    /// Funds held for in-flight withdrawals.
    pub pending_balance: Kobo,
    pub total_earnings: Kobo,
    pub this_month: Kobo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: i64,
    pub wallet_id: i64,
    pub entry_type: WalletEntryType,
    pub amount: Kobo,
    pub reference: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     Withdrawal        -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    pub reference: String,
    pub amount: Kobo,
    pub status: WithdrawalStatus,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub failure_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWithdrawal {
    pub user_id: i64,
    pub amount: Kobo,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

//--------------------------------------      CartItem         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    Notification       -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        user_id: i64,
        category: NotificationCategory,
        title: S1,
        message: S2,
    ) -> Self {
        Self { user_id, category, title: title.into(), message: message.into() }
    }
}

//--------------------------------------       Review          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub order_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub product_id: i64,
    pub user_id: i64,
    pub order_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_list_round_trip() {
        let list = RoleList::from_roles(&[Role::Customer, Role::Vendor]);
        assert_eq!(list.roles(), vec![Role::Customer, Role::Vendor]);
        assert!(list.contains(Role::Vendor));
        assert!(!list.contains(Role::Admin));
        let granted = list.with_granted(&[Role::Admin, Role::Vendor]);
        assert_eq!(granted.roles(), vec![Role::Customer, Role::Vendor, Role::Admin]);
        let (revoked, n) = granted.with_revoked(&[Role::Vendor, Role::SuperAdmin]);
        assert_eq!(n, 1);
        assert_eq!(revoked.roles(), vec![Role::Customer, Role::Admin]);
    }

    #[test]
    fn role_list_skips_garbage() {
        let list = RoleList("customer, bogus ,admin".to_string());
        assert_eq!(list.roles(), vec![Role::Customer, Role::Admin]);
    }

    fn order_with_status(status: OrderStatusType) -> Order {
        Order {
            id: 1,
            order_number: OrderNumber::from("KSW-1a2b3c-X9Q4"),
            user_id: 7,
            subtotal: Kobo::from(3000),
            tax: Kobo::from(225),
            shipping_fee: Kobo::from(0),
            total: Kobo::from(3225),
            shipping_method: ShippingMethod::Standard,
            status,
            payment_status: OrderPaymentStatus::Pending,
            payment_reference: None,
            delivered_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn order_cancellable_states() {
        let statuses = [
            (OrderStatusType::Pending, true),
            (OrderStatusType::Confirmed, true),
            (OrderStatusType::Delivered, false),
            (OrderStatusType::Cancelled, false),
            (OrderStatusType::Refunded, false),
        ];
        for (status, expected) in statuses {
            assert_eq!(order_with_status(status).is_cancellable(), expected, "status: {status}");
        }
    }
}
