use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    /// `None` keeps bookings in memory only.
    fn data_dir(&self) -> Option<PathBuf>;
    fn storage_key(&self) -> String;
    fn port(&self) -> u16;
}
