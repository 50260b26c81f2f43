use crate::{
    backend::StorageBackend,
    booking_store::BookingStore,
    error::CommandError,
    timeslots::{day_schedule, find_slot, slot_label, BookingDay},
    types::ContactDetails,
};
use chrono::{NaiveDate, TimeZone};
use std::{fmt, io::Write};
use validator::Validate;

const GRID_COLUMNS: usize = 3;
const CELL_WIDTH: usize = 16;

pub fn print_days(today: NaiveDate, out: &mut impl Write) -> Result<(), CommandError> {
    for day in BookingDay::ALL {
        writeln!(out, "{:<20} {:<20} {}", day.to_string(), day.label(), day.date(today))?;
    }
    Ok(())
}

/// Prints the slots of `date` as a grid, booked slots marked.
pub fn print_slots<S: StorageBackend, Tz: TimeZone>(
    store: &BookingStore<S>,
    date: NaiveDate,
    tz: &Tz,
    out: &mut impl Write,
) -> Result<(), CommandError>
where
    Tz::Offset: fmt::Display,
{
    let schedule = day_schedule(date, tz, &store.load());
    writeln!(out, "{date}")?;
    for row in schedule.chunks(GRID_COLUMNS) {
        let cells: Vec<String> = row
            .iter()
            .map(|slot| match slot.booked {
                true => format!("{:<CELL_WIDTH$}", format!("{} [booked]", slot.label)),
                false => format!("{:<CELL_WIDTH$}", slot.label),
            })
            .collect();
        writeln!(out, "{}", cells.join("").trim_end())?;
    }
    Ok(())
}

pub fn book<S: StorageBackend, Tz: TimeZone>(
    store: &BookingStore<S>,
    date: NaiveDate,
    tz: &Tz,
    selector: &str,
    details: ContactDetails,
    out: &mut impl Write,
) -> Result<(), CommandError>
where
    Tz::Offset: fmt::Display,
{
    details.validate()?;
    let slot_time = find_slot(date, tz, selector)?;
    let record = store.book_slot(&slot_time, details)?;
    writeln!(
        out,
        "Booked {} {} for {}",
        date,
        slot_label(&slot_time),
        record.name
    )?;
    Ok(())
}

pub fn print_bookings<S: StorageBackend, Tz: TimeZone>(
    store: &BookingStore<S>,
    tz: &Tz,
    out: &mut impl Write,
) -> Result<(), CommandError>
where
    Tz::Offset: fmt::Display,
{
    let table = store.load();
    if table.is_empty() {
        writeln!(out, "No bookings")?;
        return Ok(());
    }

    for (_, record) in table.iter() {
        let slot_time = record.slot_time.with_timezone(tz);
        writeln!(
            out,
            "{} {:<6} {} <{}> {}",
            slot_time.date_naive(),
            slot_label(&slot_time),
            record.name,
            record.email,
            record.phone_number
        )?;
    }
    Ok(())
}
