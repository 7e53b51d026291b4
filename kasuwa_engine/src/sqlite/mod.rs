//! SQLite database module for the Kasuwa Payment Engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
