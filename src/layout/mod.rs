//! Layout engine for placing pins around a symbol body
//!
//! This module takes a resolved pin list and computes the body rectangle,
//! pin positions and connection points, all in pin grid units.

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use config::LayoutConfig;
pub use engine::compute;
pub use error::LayoutError;
pub use types::*;
