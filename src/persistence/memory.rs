//! In-process store (tests, and platforms without a writable disk)

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Edit, KeyValueStore, Result, poisoned};

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn update(&self, key: &str, edit: &mut Edit<'_>) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        let next = edit(values.get(key).map(String::as_str))?;
        match next {
            Some(value) => values.insert(key.to_string(), value),
            None => values.remove(key),
        };
        Ok(())
    }
}
