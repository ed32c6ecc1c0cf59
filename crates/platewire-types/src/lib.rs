//! Shared domain types for Platewire, the real-time direct-messaging
//! subsystem: user and conversation identifiers, persisted message records,
//! wire frames, error enums, and configuration structs.

pub mod config;
pub mod conversation;
pub mod error;
pub mod frame;
pub mod message;
pub mod user;
