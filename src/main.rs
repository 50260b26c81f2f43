use crate::{
    backend::StorageBackend,
    booking_store::BookingStore,
    configuration::Configuration,
    configuration_handler::{Command, ConfigurationHandler},
    error::CommandError,
    file_storage::FileStorage,
    http::start_server,
    local_storage::LocalStorage,
    types::ContactDetails,
};
use chrono::Local;
use std::{io, process::ExitCode};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod backend;
mod booking_store;
mod commands;
mod configuration;
mod configuration_handler;
mod error;
mod file_storage;
mod http;
mod local_storage;
#[cfg(test)]
mod testutils;
mod timeslots;
mod types;

#[derive(Clone)]
struct AppState<T: StorageBackend> {
    booking_store: BookingStore<T>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let result = if let Some(data_dir) = configuration.data_dir() {
        match FileStorage::new(&data_dir) {
            Ok(storage) => {
                info!(data_dir = %storage.directory().display(), "Using booking storage");
                run(storage, configuration).await
            }
            Err(err) => Err(CommandError::Booking(err.into())),
        }
    } else {
        warn!("Running with in-memory storage, bookings are not persisted");
        run(LocalStorage::default(), configuration).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run<T: StorageBackend>(
    storage: T,
    configuration: ConfigurationHandler,
) -> Result<(), CommandError> {
    let booking_store = BookingStore::new(storage, configuration.storage_key());
    debug!(storage_key = booking_store.key(), "Opened booking store");
    let today = Local::now().date_naive();
    let mut out = io::stdout().lock();

    match configuration.command.clone() {
        Command::Days => commands::print_days(today, &mut out),
        Command::Slots { day } => {
            commands::print_slots(&booking_store, day.date(today), &Local, &mut out)
        }
        Command::Book {
            day,
            slot,
            name,
            email,
            phone,
        } => {
            let details = ContactDetails {
                name,
                email,
                phone_number: phone,
            };
            commands::book(&booking_store, day.date(today), &Local, &slot, details, &mut out)
        }
        Command::Bookings => commands::print_bookings(&booking_store, &Local, &mut out),
        Command::Serve { .. } => {
            drop(out);
            println!("#####################");
            println!("# Appointment Slots #");
            println!("#####################");
            let state = AppState { booking_store };
            start_server(state, configuration.port())
                .await
                .map_err(CommandError::Serve)
        }
    }
}
