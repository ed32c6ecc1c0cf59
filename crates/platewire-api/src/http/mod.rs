//! HTTP and WebSocket surface.

pub mod error;
pub mod handlers;
pub mod router;
