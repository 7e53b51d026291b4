//! # Kasuwa server
//! This module hosts the HTTP surface of the Kasuwa marketplace. It is responsible for:
//! Authenticating users and issuing access tokens.
//! Translating REST calls into engine API calls.
//! Receiving and verifying Paystack webhook deliveries.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Public routes cover registration, login and the product storefront. Everything under `/api`
//! requires a Bearer token, with role checks applied per route. `/webhook/paystack` is guarded
//! by the gateway's HMAC signature instead of a token.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod paystack_routes;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
