use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use crate::{backend::StorageBackend, error::StorageError};

pub struct MockStorageInner {
    pub read_success: AtomicBool,
    pub write_success: AtomicBool,
    pub calls_to_get_item: AtomicU64,
    pub calls_to_set_item: AtomicU64,
    pub items: Mutex<HashMap<String, String>>,
}

#[derive(Clone)]
pub struct MockStorage(pub Arc<MockStorageInner>);

impl MockStorageInner {
    fn new() -> Self {
        Self {
            read_success: AtomicBool::new(true),
            write_success: AtomicBool::new(true),
            calls_to_get_item: AtomicU64::default(),
            calls_to_set_item: AtomicU64::default(),
            items: Mutex::default(),
        }
    }
}

impl MockStorage {
    pub fn new() -> Self {
        Self(Arc::new(MockStorageInner::new()))
    }

    pub fn fail_reads(&self) {
        self.0.read_success.store(false, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.0.write_success.store(false, Ordering::SeqCst);
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.0
            .items
            .lock()
            .unwrap()
            .insert(key.into(), value.into());
    }

    fn result(success: &AtomicBool, key: &str) -> Result<(), StorageError> {
        match success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(StorageError::Io {
                key: key.into(),
                source: io::Error::new(io::ErrorKind::Other, "Supposed to fail"),
            }),
        }
    }
}

impl StorageBackend for MockStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.calls_to_get_item.fetch_add(1, Ordering::SeqCst);
        Self::result(&self.0.read_success, key)?;
        Ok(self.0.items.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.calls_to_set_item.fetch_add(1, Ordering::SeqCst);
        Self::result(&self.0.write_success, key)?;
        self.insert_raw(key, value);
        Ok(())
    }
}
