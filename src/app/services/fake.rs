//! In-memory stand-in for the REST API, used by unit tests.

use std::sync::Mutex;

use super::remote::{CountryService, StatsService};
use crate::app::domain::{CountryId, CountryRecord, NewCountry, PolygonList, StatEntry};
use crate::app::infrastructure::error::{AppError, Result};

#[derive(Default)]
struct FakeState {
    records: Vec<CountryRecord>,
    stats: Option<Vec<StatEntry>>,
    calls: Vec<String>,
    offline: bool,
    next_id: u64,
}

/// Behaves like the server: create assigns ids, update/delete of an unknown
/// code fails. `set_offline(true)` makes every call fail as a transport error.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CountryRecord>) -> Self {
        let api = Self::new();
        api.state.lock().unwrap().records = records;
        api
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn set_stats(&self, stats: Option<Vec<StatEntry>>) {
        self.state.lock().unwrap().stats = stats;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn begin(&self, call: String, token: &str) -> Result<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(AppError::Remote("connection refused".to_string()));
        }
        if token.is_empty() {
            return Err(AppError::Auth("missing token".to_string()));
        }
        Ok(state)
    }
}

pub fn record(id: &str, name: &str, code: &str, polygons: &str) -> CountryRecord {
    CountryRecord {
        id: CountryId(id.to_string()),
        name: name.to_string(),
        code: code.to_string(),
        polygons: serde_json::from_str(polygons).unwrap(),
    }
}

impl CountryService for FakeApi {
    fn list(&self, token: &str) -> Result<Vec<CountryRecord>> {
        let state = self.begin("list".to_string(), token)?;
        Ok(state.records.clone())
    }

    fn create(&self, token: &str, country: &NewCountry) -> Result<CountryRecord> {
        let mut state = self.begin(format!("create {}", country.code), token)?;
        state.next_id += 1;
        let created = CountryRecord {
            id: CountryId(format!("srv-{}", state.next_id)),
            name: country.name.clone(),
            code: country.code.clone(),
            polygons: country.polygons.clone(),
        };
        state.records.push(created.clone());
        Ok(created)
    }

    fn update_polygons(&self, token: &str, code: &str, polygons: &PolygonList) -> Result<()> {
        let mut state = self.begin(format!("update {}", code), token)?;
        let mut found = false;
        for r in state.records.iter_mut().filter(|r| r.code == code) {
            r.polygons = polygons.clone();
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(AppError::Remote("404 Not Found".to_string()))
        }
    }

    fn delete(&self, token: &str, code: &str) -> Result<()> {
        let mut state = self.begin(format!("delete {}", code), token)?;
        let before = state.records.len();
        state.records.retain(|r| r.code != code);
        if state.records.len() < before {
            Ok(())
        } else {
            Err(AppError::Remote("404 Not Found".to_string()))
        }
    }
}

impl StatsService for FakeApi {
    fn fetch(&self, token: &str) -> Result<Vec<StatEntry>> {
        let state = self.begin("stats".to_string(), token)?;
        state
            .stats
            .clone()
            .ok_or_else(|| AppError::Remote("500 Internal Server Error".to_string()))
    }
}
