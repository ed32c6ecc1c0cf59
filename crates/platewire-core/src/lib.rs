//! Business logic for the Platewire messaging subsystem.
//!
//! This crate is transport-agnostic: it speaks [`ServerFrame`]s through
//! per-session mpsc channels and persists through the [`MessageStore`]
//! trait, implemented by `platewire-infra`. The WebSocket plumbing lives in
//! `platewire-api`.
//!
//! [`ServerFrame`]: platewire_types::frame::ServerFrame
//! [`MessageStore`]: crate::repository::message::MessageStore

pub mod registry;
pub mod replay;
pub mod repository;
pub mod router;
pub mod session;
