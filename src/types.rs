use crate::timeslots::slot_key;
use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};
use validator::Validate;

lazy_static! {
    static ref PHONE_NUMBER: Regex = Regex::new(r"^\+?[0-9 ()\-]*[0-9][0-9 ()\-]*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(with = "slot_time")]
    pub slot_time: DateTime<Utc>,
}

/// Contact details entered for a booking. The store itself accepts any
/// record, these rules are applied by the surfaces before booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(regex(path = *PHONE_NUMBER, message = "phone number must contain digits"))]
    pub phone_number: String,
}

impl ContactDetails {
    pub fn into_record<Tz: TimeZone>(self, slot_time: &DateTime<Tz>) -> BookingRecord {
        BookingRecord {
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            slot_time: slot_time.with_timezone(&Utc),
        }
    }
}

/// All booked slots, keyed by the slot start in epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingTable(BTreeMap<String, BookingRecord>);

impl BookingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<Tz: TimeZone>(&self, slot_time: &DateTime<Tz>) -> Option<&BookingRecord> {
        self.0.get(&slot_key(slot_time))
    }

    pub fn is_booked<Tz: TimeZone>(&self, slot_time: &DateTime<Tz>) -> bool {
        self.get(slot_time).is_some()
    }

    /// Inserts the record under its own slot key and returns the record it
    /// replaced, if any.
    pub fn insert(&mut self, record: BookingRecord) -> Option<BookingRecord> {
        self.0.insert(slot_key(&record.slot_time), record)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, BookingRecord> {
        self.0.iter()
    }
}

impl FromIterator<BookingRecord> for BookingTable {
    fn from_iter<I: IntoIterator<Item = BookingRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

/// Slot times are written as epoch milliseconds. Blobs written by the mobile
/// app carry ISO-8601 strings instead, so both are accepted on read.
pub(crate) mod slot_time {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSlotTime {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(slot_time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(slot_time.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawSlotTime::deserialize(deserializer)? {
            RawSlotTime::Millis(millis) => DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| de::Error::custom(format!("slot time out of range: {millis}"))),
            RawSlotTime::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|datetime| datetime.with_timezone(&Utc))
                .map_err(de::Error::custom),
        }
    }
}
