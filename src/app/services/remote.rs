//! Remote-service boundary.
//!
//! Every country and stats call takes the bearer credential explicitly; callers
//! are responsible for not calling at all when no credential is present.

use crate::app::domain::{CountryRecord, NewCountry, PolygonList, StatEntry};
use crate::app::infrastructure::error::Result;

pub trait CountryService: Send + Sync {
    /// All records, in server order
    fn list(&self, token: &str) -> Result<Vec<CountryRecord>>;

    /// Create a record; returns the canonical record the server stored
    fn create(&self, token: &str, country: &NewCountry) -> Result<CountryRecord>;

    fn update_polygons(&self, token: &str, code: &str, polygons: &PolygonList) -> Result<()>;

    fn delete(&self, token: &str, code: &str) -> Result<()>;
}

pub trait StatsService: Send + Sync {
    fn fetch(&self, token: &str) -> Result<Vec<StatEntry>>;
}

pub trait AuthService {
    /// Exchange credentials for a bearer token
    fn login(&self, email: &str, password: &str) -> Result<String>;

    /// Create an account and return its bearer token
    fn register(&self, email: &str, password: &str) -> Result<String>;
}
