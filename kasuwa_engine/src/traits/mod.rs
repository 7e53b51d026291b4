//! Interface contracts for payment engine database backends.
//!
//! * [`PaymentGatewayDatabase`] covers the money path: order creation, the payment lifecycle,
//!   cancellation and refunds. All of its mutations are atomic.
//! * [`AccountManagement`] covers users, vendors, carts and read access to orders and payments.
//! * [`WalletManagement`] covers vendor wallets, the ledger and the two-phase withdrawal flow.
//! * [`AuthManagement`] covers role queries and role assignment.
//! * [`CatalogManagement`] covers products and reviews.
//! * [`NotificationManagement`] covers notification persistence.
mod account_management;
mod auth_management;
mod catalog_management;
mod notification_management;
mod payment_gateway_database;
mod wallet_management;

mod data_objects;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use data_objects::{PaymentConfirmation, PaymentConfirmationResult, SettledOrder, VendorCredit, WalletAudit};
pub use notification_management::NotificationManagement;
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use wallet_management::{WalletApiError, WalletManagement};
