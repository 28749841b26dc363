// YouTubeMini shared type definitions
// Each submodule defines types used across the application.

pub mod errors;
pub mod history;
pub mod settings;
pub mod stream;
pub mod tab;
