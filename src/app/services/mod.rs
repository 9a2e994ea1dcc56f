//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Polygon text parsing and rendering
//! - Remote-service traits
//! - Session context (bearer credential)

#[cfg(test)]
pub mod fake;
pub mod polygon_text;
pub mod remote;
pub mod session;
