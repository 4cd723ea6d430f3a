use std::time::Duration;

/// Storage entry the job list is kept under.
pub const DEFAULT_STORAGE_KEY: &str = "applyflow_jobs";

#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub storage_key: String,
    /// Compare-and-swap attempts per mutation before giving up with `Conflict`.
    pub max_retries: u32,
    pub lock_timeout: Duration,
    /// A lock file older than this, or naming a dead process, is broken.
    pub stale_lock_after: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_retries: 8,
            lock_timeout: Duration::from_secs(2),
            stale_lock_after: Duration::from_secs(1),
        }
    }
}
