use crate::{
    backend::StorageBackend,
    error::BookingError,
    timeslots::slot_key,
    types::{BookingRecord, BookingTable, ContactDetails},
};
use chrono::{DateTime, TimeZone};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "bookedSlots";

/// The booking table persisted as one JSON blob under a fixed storage key.
///
/// Clones share the writer lock, so bookings made through any clone are
/// serialized against each other.
#[derive(Clone)]
pub struct BookingStore<S: StorageBackend> {
    storage: S,
    key: String,
    writer: Arc<Mutex<()>>,
}

impl<S: StorageBackend> BookingStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            writer: Arc::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the table. `Ok(None)` means nothing was ever saved.
    pub fn try_load(&self) -> Result<Option<BookingTable>, BookingError> {
        let Some(blob) = self.storage.get_item(&self.key)? else {
            debug!(key = %self.key, "No booking table stored yet");
            return Ok(None);
        };

        let table: BookingTable =
            serde_json::from_str(&blob).map_err(|source| BookingError::CorruptStore {
                key: self.key.clone(),
                source,
            })?;
        debug!(key = %self.key, bookings = table.len(), "Loaded booking table");
        Ok(Some(table))
    }

    /// Reads the table, falling back to an empty one when nothing is stored
    /// or the stored data can't be read.
    pub fn load(&self) -> BookingTable {
        match self.try_load() {
            Ok(table) => table.unwrap_or_default(),
            Err(err) => {
                warn!(%err, "Failed to load booking table, continuing with an empty one");
                BookingTable::new()
            }
        }
    }

    /// Overwrites the stored blob with the full table.
    pub fn save(&self, table: &BookingTable) -> Result<(), BookingError> {
        let blob = serde_json::to_string(table).map_err(BookingError::Serialize)?;
        self.storage.set_item(&self.key, &blob)?;
        info!(key = %self.key, bookings = table.len(), "Saved booking table");
        Ok(())
    }

    /// Books `slot_time` for `details`. The load, presence check and save run
    /// under the writer lock, so a slot is never handed out twice through this
    /// store. A corrupt stored table fails the booking instead of being
    /// overwritten.
    pub fn book_slot<Tz: TimeZone>(
        &self,
        slot_time: &DateTime<Tz>,
        details: ContactDetails,
    ) -> Result<BookingRecord, BookingError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut table = self.try_load()?.unwrap_or_default();
        if table.is_booked(slot_time) {
            let key = slot_key(slot_time);
            warn!(slot = %key, "Slot was already booked");
            return Err(BookingError::SlotAlreadyBooked(key));
        }

        let record = details.into_record(slot_time);
        table.insert(record.clone());
        self.save(&table)?;

        info!(
            slot = %slot_key(slot_time),
            name = %record.name,
            "Booked slot"
        );
        Ok(record)
    }
}
