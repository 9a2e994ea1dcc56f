//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Country records and polygon data
//! - Usage statistics
//! - Client settings
//! - Message types for completed background calls

pub mod country;
pub mod messages;
pub mod settings;
pub mod stats;

pub use country::{Coordinate, CountryId, CountryRecord, NewCountry, Polygon, PolygonList};
pub use messages::{Delivery, Message};
pub use settings::ClientSettings;
pub use stats::{StatEntry, StatsResponse};
