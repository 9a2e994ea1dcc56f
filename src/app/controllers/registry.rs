use crate::app::domain::{CountryRecord, NewCountry, PolygonList};
use crate::app::infrastructure::error::Result;
use crate::app::services::remote::CountryService;
use crate::app::services::session::SessionContext;

/// Client-side mirror of the remote country collection, in server order.
///
/// Local state only changes after the corresponding remote call succeeded.
/// Codes are expected to be unique but this is the server's job; remove and
/// update act on every local record carrying the code.
#[derive(Debug, Default)]
pub struct CountryRegistry {
    records: Vec<CountryRecord>,
}

impl CountryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&CountryRecord> {
        self.records.iter().find(|r| r.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// Drop all records (logout teardown)
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Replace the whole collection with the server listing.
    pub fn load(&mut self, session: &SessionContext, service: &dyn CountryService) -> Result<()> {
        let token = session.require_token()?;
        let listing = service.list(token)?;
        self.apply_listing(listing);
        Ok(())
    }

    /// Create a record remotely and append the server's canonical copy.
    pub fn add(
        &mut self,
        session: &SessionContext,
        service: &dyn CountryService,
        name: &str,
        code: &str,
        polygons: PolygonList,
    ) -> Result<&CountryRecord> {
        let token = session.require_token()?;
        let country = NewCountry {
            name: name.to_string(),
            code: code.to_string(),
            polygons,
        };
        let created = service.create(token, &country)?;
        Ok(self.apply_created(created))
    }

    pub fn remove(&mut self, session: &SessionContext, service: &dyn CountryService, code: &str) -> Result<()> {
        let token = session.require_token()?;
        service.delete(token, code)?;
        self.apply_removed(code);
        Ok(())
    }

    /// Replace the polygons of every record with `code`; name and code stay.
    pub fn update_polygons(
        &mut self,
        session: &SessionContext,
        service: &dyn CountryService,
        code: &str,
        polygons: PolygonList,
    ) -> Result<()> {
        let token = session.require_token()?;
        service.update_polygons(token, code, &polygons)?;
        self.apply_polygons(code, polygons);
        Ok(())
    }

    pub fn apply_listing(&mut self, listing: Vec<CountryRecord>) {
        log::debug!("Loaded {} countries", listing.len());
        self.records = listing;
    }

    pub fn apply_created(&mut self, record: CountryRecord) -> &CountryRecord {
        log::debug!("Added country {}", record.code);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Returns how many local records were removed.
    pub fn apply_removed(&mut self, code: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.code != code);
        let removed = before - self.records.len();
        log::debug!("Removed {} record(s) with code {}", removed, code);
        removed
    }

    /// Returns how many local records were updated. Zero when the record was
    /// removed before the update landed.
    pub fn apply_polygons(&mut self, code: &str, polygons: PolygonList) -> usize {
        let mut updated = 0;
        for record in self.records.iter_mut().filter(|r| r.code == code) {
            record.polygons = polygons.clone();
            updated += 1;
        }
        if updated == 0 {
            log::debug!("Polygon update for {} matched no local record", code);
        }
        updated
    }
}
