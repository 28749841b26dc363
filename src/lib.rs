//! YouTubeMini: a tiny YouTube player that follows the videos open in your browser.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
