//! Kasuwa Payment Engine
//!
//! The engine holds the core logic of the Kasuwa digital-goods marketplace: orders, Paystack
//! payments, vendor wallets and withdrawals, the product catalog, reviews and notifications.
//! It is HTTP-agnostic; the server crate drives it.
//!
//! The crate is divided into three main sections:
//! 1. Storage traits ([`mod@traits`]) that a database backend must implement, and the SQLite
//!    implementation of them ([`SqliteDatabase`]). You should never need to touch the database
//!    directly; the data types in [`mod@db_types`] are the public surface.
//! 2. The public API layer ([`mod@mkt_api`]): thin wrappers (`OrderFlowApi`, `WalletApi`, ...)
//!    over the storage traits that add event emission and logging.
//! 3. An event layer ([`mod@events`]). When something notable happens (an order is paid, a
//!    withdrawal settles) an event is published to subscribed hooks. Side effects such as
//!    notification persistence hang off these hooks and never block the money path.
pub mod db_types;
pub mod events;
pub mod helpers;
mod mkt_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use mkt_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    catalog_api::CatalogApi,
    notification_api::NotificationApi,
    order_flow_api::OrderFlowApi,
    wallet_api::WalletApi,
};
