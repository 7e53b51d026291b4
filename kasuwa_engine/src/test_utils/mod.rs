//! Helpers for integration tests: a fresh migrated database per test, plus seed data.
mod prepare_env;
mod seeds;

pub use prepare_env::{create_database, prepare_test_env, random_db_path, run_migrations};
pub use seeds::{seed_approved_product, seed_customer, seed_vendor};
