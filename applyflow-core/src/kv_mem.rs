use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ApplyFlowError, Result};
use crate::kv::{KvStore, Revision, Versioned};

#[derive(Default)]
pub struct MemKvStore {
    entries: Mutex<HashMap<String, Versioned>>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemKvStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>> {
        let map = self
            .entries
            .lock()
            .map_err(|_| ApplyFlowError::Format("kv mutex poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn compare_and_swap(&self, key: &str, expected: Option<Revision>, value: &[u8]) -> Result<bool> {
        let mut map = self
            .entries
            .lock()
            .map_err(|_| ApplyFlowError::Format("kv mutex poisoned".into()))?;
        let current = map.get(key).map(|v| v.revision);
        if current != expected {
            return Ok(false);
        }
        map.insert(key.to_string(), Versioned::new(value.to_vec()));
        Ok(true)
    }
}
