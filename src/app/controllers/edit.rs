use super::registry::CountryRegistry;
use crate::app::domain::{CountryRecord, PolygonList};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::polygon_text;
use crate::app::services::remote::CountryService;
use crate::app::services::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing { code: String, buffer: String },
}

/// Single-slot polygon editor.
///
/// At most one record is edited at a time; `begin` refuses a second edit.
/// A failed commit, whether rejected by the validator or by the server, keeps
/// the edit open with its buffer so the user can correct and retry.
#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn editing_code(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { code, .. } => Some(code.as_str()),
            EditState::Idle => None,
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { buffer, .. } => Some(buffer.as_str()),
            EditState::Idle => None,
        }
    }

    pub fn begin(&mut self, record: &CountryRecord) -> Result<()> {
        if let EditState::Editing { code, .. } = &self.state {
            return Err(AppError::EditInProgress(code.clone()));
        }
        log::debug!("Editing polygons of {}", record.code);
        self.state = EditState::Editing {
            code: record.code.clone(),
            buffer: polygon_text::to_edit_text(&record.polygons),
        };
        Ok(())
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) -> Result<()> {
        match &mut self.state {
            EditState::Editing { buffer, .. } => {
                *buffer = text.into();
                Ok(())
            }
            EditState::Idle => Err(AppError::NoActiveEdit),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(code) = self.editing_code() {
            log::debug!("Cancelled edit of {}", code);
        }
        self.state = EditState::Idle;
    }

    /// Validate the buffer without touching the remote.
    /// Returns the code being edited and the parsed polygons.
    pub fn prepare_commit(&self) -> Result<(String, PolygonList)> {
        match &self.state {
            EditState::Editing { code, buffer } => {
                let polygons = polygon_text::parse(buffer)?;
                Ok((code.clone(), polygons))
            }
            EditState::Idle => Err(AppError::NoActiveEdit),
        }
    }

    /// Mark `committed` as stored for `code`. The edit closes only if it is
    /// still on that code and its buffer still holds those polygons; a buffer
    /// changed while the update was in flight stays open.
    pub fn finish(&mut self, code: &str, committed: &PolygonList) {
        let EditState::Editing { code: editing, buffer } = &self.state else {
            return;
        };
        if editing != code {
            return;
        }
        match polygon_text::parse(buffer) {
            Ok(current) if current == *committed => self.state = EditState::Idle,
            _ => log::debug!("Edit of {} changed during commit; keeping it open", code),
        }
    }

    /// Validate, push to the server, and close the edit on success.
    pub fn commit(
        &mut self,
        registry: &mut CountryRegistry,
        session: &SessionContext,
        service: &dyn CountryService,
    ) -> Result<()> {
        let (code, polygons) = self.prepare_commit()?;
        match registry.update_polygons(session, service, &code, polygons.clone()) {
            Ok(()) => {
                self.finish(&code, &polygons);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to update polygons of {}: {}", code, e);
                Err(e)
            }
        }
    }
}
