use crate::{booking_store::DEFAULT_STORAGE_KEY, configuration::Configuration, timeslots::BookingDay};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Book two-hour appointment slots for today, tomorrow and the day after.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct ConfigurationHandler {
    /// Directory the booking table is stored in
    #[arg(long, env = "BOOKING_DATA_DIR", default_value = ".bookings", global = true)]
    data_dir: PathBuf,

    /// Keep bookings in memory only
    #[arg(long, env = "BOOKING_EPHEMERAL", global = true)]
    ephemeral: bool,

    /// Storage key the booking table is saved under
    #[arg(long, env = "BOOKING_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY, global = true)]
    storage_key: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the bookable days
    Days,
    /// Show the slots of a day
    Slots {
        #[arg(long, default_value = "today")]
        day: BookingDay,
    },
    /// Book a slot
    Book {
        #[arg(long)]
        day: BookingDay,
        /// Slot label such as "2 PM", or the slot start in epoch milliseconds
        #[arg(long)]
        slot: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// List all bookings
    Bookings,
    /// Serve the booking API over HTTP
    Serve {
        #[arg(long, env = "BOOKING_PORT", default_value_t = 3000)]
        port: u16,
    },
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn data_dir(&self) -> Option<PathBuf> {
        (!self.ephemeral).then(|| self.data_dir.clone())
    }

    fn storage_key(&self) -> String {
        self.storage_key.clone()
    }

    fn port(&self) -> u16 {
        match self.command {
            Command::Serve { port } => port,
            _ => 3000,
        }
    }
}
