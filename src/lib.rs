//! Dashlink - client-side push delivery for a live dashboard
//!
//! This library receives server-pushed events over two persistent WebSocket
//! subscriptions and renders them: user-directed popup notifications on one
//! channel, broadcast counter updates on the other.

pub mod app;
pub mod channel;
pub mod cli;
pub mod config;
pub mod core;
pub mod render;
pub mod task_manager;

// Re-export core types for convenience
pub use crate::core::*;
