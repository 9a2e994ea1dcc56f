use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::controllers::edit::EditSession;
use super::controllers::registry::CountryRegistry;
use super::controllers::stats::StatsView;
use super::domain::{Delivery, Message, NewCountry, PolygonList};
use super::infrastructure::error::{AppError, Result};
use super::services::remote::{AuthService, CountryService, StatsService};
use super::services::session::SessionContext;

/// Main coordinator: one authenticated user, one registry, one edit slot.
///
/// `spawn_*` methods run the remote call on a worker thread; the completed
/// result comes back as a [`Delivery`] and is applied on this thread by
/// [`AppState::handle_message`]. Results issued before the latest logout
/// are dropped.
pub struct AppState {
    pub session: SessionContext,
    pub registry: CountryRegistry,
    pub edit: EditSession,
    pub stats: StatsView,
    countries: Arc<dyn CountryService>,
    stats_service: Arc<dyn StatsService>,
    sender: Sender<Delivery>,
    receiver: Receiver<Delivery>,
    epoch: u64,
    pending: usize,
}

impl AppState {
    pub fn new(
        session: SessionContext,
        countries: Arc<dyn CountryService>,
        stats_service: Arc<dyn StatsService>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            session,
            registry: CountryRegistry::new(),
            edit: EditSession::new(),
            stats: StatsView::new(),
            countries,
            stats_service,
            sender,
            receiver,
            epoch: 0,
            pending: 0,
        }
    }

    /// Number of background calls whose result has not been handled yet
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn login(&mut self, auth: &dyn AuthService, email: &str, password: &str) -> Result<()> {
        let token = auth.login(email, password)?;
        self.session.login(token)
    }

    pub fn register(&mut self, auth: &dyn AuthService, email: &str, password: &str) -> Result<()> {
        let token = auth.register(email, password)?;
        self.session.login(token)
    }

    /// Clear the credential and tear down everything derived from it.
    pub fn logout(&mut self) -> Result<()> {
        self.epoch += 1;
        self.registry.clear();
        self.edit.cancel();
        self.stats.clear();
        self.session.logout()
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        let reply = Reply {
            sender: self.sender.clone(),
            epoch: self.epoch,
            message: None,
        };
        self.pending += 1;
        thread::spawn(move || {
            let mut reply = reply;
            reply.message = Some(job());
        });
    }

    pub fn spawn_load(&mut self) -> Result<()> {
        let token = self.session.require_token()?.to_string();
        let service = Arc::clone(&self.countries);
        self.spawn(move || Message::CountriesLoaded(service.list(&token)));
        Ok(())
    }

    pub fn spawn_add(&mut self, name: &str, code: &str, polygons: PolygonList) -> Result<()> {
        let token = self.session.require_token()?.to_string();
        let service = Arc::clone(&self.countries);
        let country = NewCountry {
            name: name.to_string(),
            code: code.to_string(),
            polygons,
        };
        self.spawn(move || Message::CountryCreated(service.create(&token, &country)));
        Ok(())
    }

    pub fn spawn_remove(&mut self, code: &str) -> Result<()> {
        let token = self.session.require_token()?.to_string();
        let service = Arc::clone(&self.countries);
        let code = code.to_string();
        self.spawn(move || {
            let result = service.delete(&token, &code);
            Message::CountryRemoved { code, result }
        });
        Ok(())
    }

    /// Validate the edit buffer and send it. A validation error is returned
    /// immediately and nothing is sent.
    pub fn spawn_commit(&mut self) -> Result<()> {
        let (code, polygons) = self.edit.prepare_commit()?;
        let token = self.session.require_token()?.to_string();
        let service = Arc::clone(&self.countries);
        self.spawn(move || {
            let result = service.update_polygons(&token, &code, &polygons);
            Message::EditCommitted {
                code,
                polygons,
                result,
            }
        });
        Ok(())
    }

    /// Fetch stats in the background. Without a credential the table is
    /// simply emptied.
    pub fn spawn_stats(&mut self) {
        let Some(token) = self.session.token().map(str::to_string) else {
            self.stats.clear();
            return;
        };
        let service = Arc::clone(&self.stats_service);
        self.spawn(move || Message::StatsLoaded(service.fetch(&token)));
    }

    /// Apply one completed call. Errors are those of the remote call itself,
    /// returned for display; local state is unchanged in that case.
    pub fn handle_message(&mut self, delivery: Delivery) -> Result<()> {
        self.pending = self.pending.saturating_sub(1);
        if delivery.epoch != self.epoch {
            log::debug!("Dropping result from a previous session: {:?}", delivery.message);
            return Ok(());
        }

        match delivery.message {
            Message::CountriesLoaded(result) => {
                self.registry.apply_listing(result?);
            }
            Message::CountryCreated(result) => {
                self.registry.apply_created(result?);
            }
            Message::CountryRemoved { code, result } => {
                result?;
                self.registry.apply_removed(&code);
            }
            Message::EditCommitted {
                code,
                polygons,
                result,
            } => {
                if let Err(e) = result {
                    log::warn!("Failed to update polygons of {}: {}", code, e);
                    return Err(e);
                }
                self.edit.finish(&code, &polygons);
                self.registry.apply_polygons(&code, polygons);
            }
            Message::StatsLoaded(result) => self.stats.apply(result),
            Message::Aborted => {
                log::error!("Background request aborted");
                return Err(AppError::Remote("Background request aborted".to_string()));
            }
        }
        Ok(())
    }

    /// Handle every result that has already arrived, without blocking.
    pub fn drain(&mut self) -> Vec<AppError> {
        let mut errors = Vec::new();
        while let Ok(delivery) = self.receiver.try_recv() {
            if let Err(e) = self.handle_message(delivery) {
                errors.push(e);
            }
        }
        errors
    }

    /// Block until every outstanding call has been handled.
    pub fn wait_all(&mut self) -> Vec<AppError> {
        let mut errors = Vec::new();
        while self.pending > 0 {
            let Ok(delivery) = self.receiver.recv() else {
                break;
            };
            if let Err(e) = self.handle_message(delivery) {
                errors.push(e);
            }
        }
        errors
    }
}

/// Sends the worker's message when dropped, so that a worker that unwinds
/// still reports back and `pending` reaches zero.
struct Reply {
    sender: Sender<Delivery>,
    epoch: u64,
    message: Option<Message>,
}

impl Drop for Reply {
    fn drop(&mut self) {
        let message = self.message.take().unwrap_or(Message::Aborted);
        // The receiver only goes away with the AppState itself
        let _ = self.sender.send(Delivery {
            epoch: self.epoch,
            message,
        });
    }
}
