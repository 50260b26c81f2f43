use crate::{backend::StorageBackend, error::StorageError};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// In-memory storage. Clones share the same entries, nothing survives a
/// restart.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
