// applyflow_core/src/kv.rs
use std::fmt;

use crate::error::Result;

/// Content digest of a stored value; changes whenever the bytes do.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision([u8; 32]);

impl Revision {
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({self})")
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..8]))
    }
}

#[derive(Clone, Debug)]
pub struct Versioned {
    pub bytes: Vec<u8>,
    pub revision: Revision,
}

impl Versioned {
    pub fn new(bytes: Vec<u8>) -> Self {
        let revision = Revision::of(&bytes);
        Self { bytes, revision }
    }
}

/// Named-entry store the job list lives in.
pub trait KvStore: Send + Sync {
    /// `Ok(None)` when the entry was never written.
    fn get(&self, key: &str) -> Result<Option<Versioned>>;

    /// Writes `value` only if the entry is still at `expected` (`None` = absent).
    /// Returns `Ok(false)` when someone else got there first.
    fn compare_and_swap(&self, key: &str, expected: Option<Revision>, value: &[u8]) -> Result<bool>;
}
