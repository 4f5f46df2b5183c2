//! # showcase-store
//!
//! Document storage for the product showcase, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection`, runs schema migrations on open, and provides the
//! product insert and newest-first listing operations. Callers on an async
//! runtime are expected to move calls onto a blocking thread.

pub mod database;
pub mod migrations;
pub mod products;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use rusqlite::InterruptHandle;
