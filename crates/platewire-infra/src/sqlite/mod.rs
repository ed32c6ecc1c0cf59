//! SQLite persistence layer.

pub mod message;
pub mod pool;
