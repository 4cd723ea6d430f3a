use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ApplyFlowError, Result};
use crate::kv::{KvStore, Revision, Versioned};
use crate::options::StoreOptions;

const LOCK_POLL: Duration = Duration::from_millis(5);

/// One `<key>.json` file per entry under `dir`.
pub struct FsKvStore {
    dir: PathBuf,
    lock_timeout: Duration,
    stale_after: Duration,
}

impl FsKvStore {
    pub fn open(dir: &Path, opts: &StoreOptions) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            lock_timeout: opts.lock_timeout,
            stale_after: opts.stale_lock_after,
        })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.json", checked_key(key)?)))
    }

    fn lock(&self, key: &str) -> Result<LockGuard> {
        let path = self.dir.join(format!("{}.lock", checked_key(key)?));
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut f) => {
                    let _ = writeln!(f, "{}", std::process::id());
                    return Ok(LockGuard { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if self.break_if_stale(&path)? {
                        continue;
                    }
                    if started.elapsed() >= self.lock_timeout {
                        warn!(lock = %path.display(), "gave up waiting for lock");
                        return Err(ApplyFlowError::LockTimeout(path.display().to_string()));
                    }
                    thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Removes a lock left behind by a crashed or killed writer.
    fn break_if_stale(&self, path: &Path) -> Result<bool> {
        let Some(seen) = LockInfo::read(path)? else {
            // already released, try again
            return Ok(true);
        };
        let dead_owner = seen.pid.is_some_and(|pid| !process_alive(pid));
        let expired = seen.age.is_some_and(|age| age >= self.stale_after);
        if !dead_owner && !expired {
            return Ok(false);
        }
        // Only remove the lock we judged; a fresh owner may have replaced it.
        if LockInfo::read(path)?.is_some_and(|now| now.same_lock(&seen)) {
            warn!(lock = %path.display(), pid = ?seen.pid, age = ?seen.age, "breaking stale lock");
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    fn read_entry(&self, path: &Path) -> Result<Option<Versioned>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Versioned::new(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl KvStore for FsKvStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>> {
        let path = self.entry_path(key)?;
        self.read_entry(&path)
    }

    fn compare_and_swap(&self, key: &str, expected: Option<Revision>, value: &[u8]) -> Result<bool> {
        let path = self.entry_path(key)?;
        let _guard = self.lock(key)?;

        let current = self.read_entry(&path)?.map(|v| v.revision);
        if current != expected {
            debug!(key, "revision moved, refusing write");
            return Ok(false);
        }

        // Readers see either the old file or the new one, never a partial write.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| ApplyFlowError::Io(e.error))?;
        Ok(true)
    }
}

struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

struct LockInfo {
    pid: Option<u32>,
    modified: Option<SystemTime>,
    age: Option<Duration>,
}

impl LockInfo {
    fn read(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let modified = match fs::metadata(path) {
            Ok(md) => md.modified().ok(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(Self {
            pid: raw.trim().parse().ok(),
            modified,
            age: modified.and_then(|t| t.elapsed().ok()),
        }))
    }

    fn same_lock(&self, other: &LockInfo) -> bool {
        self.pid == other.pid && self.modified == other.modified
    }
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    pid == std::process::id() || Path::new("/proc").join(pid.to_string()).exists()
}

// No cheap liveness probe elsewhere; rely on lock age.
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}

fn checked_key(key: &str) -> Result<&str> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if ok {
        Ok(key)
    } else {
        Err(ApplyFlowError::Format(format!("invalid storage key \"{key}\"")))
    }
}
