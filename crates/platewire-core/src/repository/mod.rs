//! Storage trait definitions, implemented by `platewire-infra`.

pub mod message;
