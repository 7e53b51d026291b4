//! The public marketplace APIs.
//!
//! These are thin, backend-generic wrappers over the [`traits`](crate::traits) module. The
//! order flow and wallet APIs additionally fan events out to any registered hooks.
pub mod accounts_api;
pub mod auth_api;
pub mod catalog_api;
pub mod notification_api;
pub mod order_flow_api;
pub mod wallet_api;
