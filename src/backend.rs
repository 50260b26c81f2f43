use crate::error::StorageError;

/// Key-value blob storage the booking store persists into.
pub trait StorageBackend: Clone + Send + Sync + 'static {
    /// Returns `None` when nothing was ever written under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
