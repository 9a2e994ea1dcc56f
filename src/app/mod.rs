//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (CountryRecord, StatEntry, Settings, Messages)
//! - `controllers/` - Orchestration (CountryRegistry, EditSession, StatsView)
//! - `services/` - Business operations (polygon text, remote traits, session)
//! - `infrastructure/` - External integrations (HTTP, credential store, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::edit::{EditSession, EditState};
pub use controllers::registry::CountryRegistry;
pub use controllers::stats::StatsView;
pub use domain::{ClientSettings, CountryRecord, PolygonList, StatEntry};
pub use infrastructure::credential_store::CredentialStore;
pub use infrastructure::error::{AppError, Result};
pub use infrastructure::http::HttpApi;
pub use services::session::{SessionContext, UserClaims};
pub use state::AppState;
