use super::country::{CountryRecord, PolygonList};
use super::stats::StatEntry;
use crate::app::infrastructure::error::Result;

/// Completed remote calls handed back to the owning thread.
/// Each background request sends exactly one of these; `AppState::handle_message`
/// applies it.
#[derive(Debug)]
pub enum Message {
    CountriesLoaded(Result<Vec<CountryRecord>>),
    CountryCreated(Result<CountryRecord>),
    CountryRemoved {
        code: String,
        result: Result<()>,
    },
    EditCommitted {
        code: String,
        polygons: PolygonList,
        result: Result<()>,
    },
    StatsLoaded(Result<Vec<StatEntry>>),
    /// The worker ended without producing a result (it panicked).
    Aborted,
}

/// A message stamped with the session epoch it was issued under.
#[derive(Debug)]
pub struct Delivery {
    pub epoch: u64,
    pub message: Message,
}
