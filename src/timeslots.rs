use crate::{error::SlotError, types::BookingTable};
use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const SLOT_STEP_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingDay {
    Today,
    Tomorrow,
    DayAfterTomorrow,
}

impl BookingDay {
    pub const ALL: [BookingDay; 3] = [
        BookingDay::Today,
        BookingDay::Tomorrow,
        BookingDay::DayAfterTomorrow,
    ];

    pub fn offset(self) -> u64 {
        match self {
            BookingDay::Today => 0,
            BookingDay::Tomorrow => 1,
            BookingDay::DayAfterTomorrow => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookingDay::Today => "Today",
            BookingDay::Tomorrow => "Tomorrow",
            BookingDay::DayAfterTomorrow => "Day After Tomorrow",
        }
    }

    pub fn date(self, today: NaiveDate) -> NaiveDate {
        today + Days::new(self.offset())
    }
}

impl fmt::Display for BookingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingDay::Today => "today",
            BookingDay::Tomorrow => "tomorrow",
            BookingDay::DayAfterTomorrow => "day-after-tomorrow",
        };
        f.write_str(name)
    }
}

impl FromStr for BookingDay {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingDay::ALL
            .into_iter()
            .find(|day| day.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SlotError::UnknownDay(s.into()))
    }
}

/// A generated slot together with its booking state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub slot_time: DateTime<Utc>,
    pub label: String,
    pub booked: bool,
}

pub fn slot_key<Tz: TimeZone>(slot_time: &DateTime<Tz>) -> String {
    slot_time.timestamp_millis().to_string()
}

pub fn slot_label<Tz: TimeZone>(slot_time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    slot_time.format("%-I %p").to_string()
}

/// First existing local instant of `day`. Local midnight is skipped in zones
/// that switch to daylight saving time at midnight.
pub fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..24 * 60)
        .find_map(|minute| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minute)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Last millisecond of `day` in local time.
pub fn end_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    start_of_day(day + Days::new(1), tz) - Duration::milliseconds(1)
}

/// Bookable slots of `day`, from local midnight up to local end of day, each
/// exactly `SLOT_STEP_HOURS` after the previous one.
pub fn day_slots<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Vec<DateTime<Tz>> {
    let end = end_of_day(day, tz);
    let step = Duration::hours(SLOT_STEP_HOURS);

    std::iter::successors(Some(start_of_day(day, tz)), |slot| {
        Some(slot.clone() + step)
    })
    .take_while(|slot| *slot <= end)
    .collect()
}

pub fn day_schedule<Tz: TimeZone>(day: NaiveDate, tz: &Tz, table: &BookingTable) -> Vec<SlotView>
where
    Tz::Offset: fmt::Display,
{
    day_slots(day, tz)
        .into_iter()
        .map(|slot_time| SlotView {
            label: slot_label(&slot_time),
            booked: table.is_booked(&slot_time),
            slot_time: slot_time.with_timezone(&Utc),
        })
        .collect()
}

/// Resolves a slot of `day` from its label (`2 PM`) or its epoch
/// milliseconds. Only generated slots resolve.
pub fn find_slot<Tz: TimeZone>(day: NaiveDate, tz: &Tz, selector: &str) -> Result<DateTime<Tz>, SlotError>
where
    Tz::Offset: fmt::Display,
{
    let selector = selector.trim();
    day_slots(day, tz)
        .into_iter()
        .find(|slot| {
            slot_key(slot) == selector || slot_label(slot).eq_ignore_ascii_case(selector)
        })
        .ok_or_else(|| SlotError::UnknownSlot {
            day,
            slot: selector.into(),
        })
}
