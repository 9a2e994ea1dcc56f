//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - HTTP client for the REST API
//! - Credential persistence
//! - Error types

pub mod credential_store;
pub mod error;
pub mod http;
