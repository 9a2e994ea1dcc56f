//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the front end:
//! - Country registry
//! - Polygon edit session
//! - Usage statistics view

pub mod edit;
pub mod registry;
pub mod stats;
