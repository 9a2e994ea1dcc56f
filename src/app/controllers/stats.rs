use crate::app::domain::StatEntry;
use crate::app::infrastructure::error::Result;
use crate::app::services::remote::StatsService;
use crate::app::services::session::SessionContext;

/// Read-only usage table. Load failures are logged and leave an empty table;
/// they never reach the caller.
#[derive(Debug, Default)]
pub struct StatsView {
    entries: Vec<StatEntry>,
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[StatEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn load(&mut self, session: &SessionContext, service: &dyn StatsService) {
        let Some(token) = session.token() else {
            log::debug!("Skipping stats fetch: not logged in");
            self.entries.clear();
            return;
        };
        self.apply(service.fetch(token));
    }

    pub fn apply(&mut self, result: Result<Vec<StatEntry>>) {
        match result {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                log::warn!("Failed to fetch stats: {}", e);
                self.entries.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::fake::FakeApi;

    fn entry(code: &str, total: u64, inside: u64) -> StatEntry {
        StatEntry {
            code: code.to_string(),
            total_requests: total,
            true_responses: inside,
            false_responses: total - inside,
        }
    }

    fn logged_in() -> SessionContext {
        let mut session = SessionContext::in_memory();
        session.login("token").unwrap();
        session
    }

    #[test]
    fn test_load_stats() {
        let api = FakeApi::new();
        api.set_stats(Some(vec![entry("US", 12, 9), entry("CA", 3, 0)]));
        let mut view = StatsView::new();

        view.load(&logged_in(), &api);
        assert_eq!(view.entries().len(), 2);
        assert_eq!(view.entries()[0], entry("US", 12, 9));
    }

    #[test]
    fn test_failure_renders_empty_table() {
        let api = FakeApi::new();
        api.set_stats(Some(vec![entry("US", 1, 1)]));
        let session = logged_in();
        let mut view = StatsView::new();
        view.load(&session, &api);
        assert_eq!(view.entries().len(), 1);

        api.set_stats(None);
        view.load(&session, &api);
        assert!(view.entries().is_empty());
    }

    #[test]
    fn test_no_credential_skips_fetch() {
        let api = FakeApi::new();
        api.set_stats(Some(vec![entry("US", 1, 1)]));
        let mut view = StatsView::new();

        view.load(&SessionContext::in_memory(), &api);
        assert!(view.entries().is_empty());
        assert!(api.calls().is_empty());
    }
}
