use chrono::NaiveDate;
use std::io;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access storage entry '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("stored booking table under '{key}' is corrupt: {source}")]
    CorruptStore {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize booking table: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("slot {0} is already booked")]
    SlotAlreadyBooked(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("unknown day '{0}', expected today, tomorrow or day-after-tomorrow")]
    UnknownDay(String),

    #[error("no slot '{slot}' on {day}")]
    UnknownSlot { day: NaiveDate, slot: String },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("invalid booking details: {0}")]
    InvalidDetails(#[from] ValidationErrors),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("failed to serve booking API: {0}")]
    Serve(#[source] io::Error),
}
