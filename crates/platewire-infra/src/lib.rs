//! Infrastructure implementations for Platewire: SQLite message store,
//! HMAC access-token gate, and configuration loading.

pub mod auth;
pub mod config;
pub mod sqlite;
