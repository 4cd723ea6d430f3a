//! Job store: CRUD over the persisted, most-recent-first job list.
//!
//! Every mutation reads the whole list, edits it in memory and writes it back
//! with compare-and-swap. A lost race re-runs the edit against the fresh list,
//! so writers in different processes never clobber each other.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::{JobDraft, JobPatch, JobRecord, JobStatus, canonical_url};
use crate::error::{ApplyFlowError, Result};
use crate::kv::{KvStore, Revision};
use crate::options::StoreOptions;
use crate::stats::Stats;

pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

#[derive(Clone)]
pub struct JobStore {
    kv: Arc<dyn KvStore>,
    opts: StoreOptions,
    clock: Clock,
}

/// Outcome of one in-memory edit of the list.
enum Edit<T> {
    /// List untouched, nothing to write.
    Unchanged(T),
    Changed(T),
}

impl JobStore {
    pub fn new(kv: Arc<dyn KvStore>, opts: StoreOptions) -> Self {
        Self {
            kv,
            opts,
            clock: Arc::new(OffsetDateTime::now_utc),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn list_all(&self) -> Result<Vec<JobRecord>> {
        Ok(self.load()?.0)
    }

    pub fn get(&self, id: &str) -> Result<Option<JobRecord>> {
        Ok(self.list_all()?.into_iter().find(|j| j.id == id))
    }

    /// Upsert by URL. An existing record keeps its id, `date_saved`,
    /// `date_applied` and notes; a new one is prepended.
    pub fn save(&self, draft: JobDraft) -> Result<JobRecord> {
        let draft = draft.validated()?;
        self.modify(|jobs, now| {
            if let Some(existing) = jobs
                .iter_mut()
                .find(|j| canonical_url(&j.url) == draft.url)
            {
                existing.title = draft.title.clone();
                existing.company = draft.company.clone();
                existing.status = draft.status;
                existing.stamp_applied(now);
                debug!(id = %existing.id, url = %existing.url, "updated existing job");
                return Ok(Edit::Changed(existing.clone()));
            }

            let mut rec = JobRecord {
                id: new_id()?,
                title: draft.title.clone(),
                company: draft.company.clone(),
                url: draft.url.clone(),
                status: draft.status,
                date_saved: now,
                date_applied: None,
                notes: None,
            };
            rec.stamp_applied(now);
            debug!(id = %rec.id, url = %rec.url, "saved new job");
            jobs.insert(0, rec.clone());
            Ok(Edit::Changed(rec))
        })
    }

    /// Merges `patch` into the record with `id`. Unknown ids are a silent
    /// no-op and yield `None`.
    pub fn update(&self, id: &str, patch: &JobPatch) -> Result<Option<JobRecord>> {
        self.modify(|jobs, now| {
            let Some(rec) = jobs.iter_mut().find(|j| j.id == id) else {
                debug!(id, "update of unknown job ignored");
                return Ok(Edit::Unchanged(None));
            };
            if patch.is_empty() {
                return Ok(Edit::Unchanged(Some(rec.clone())));
            }
            rec.apply_patch(patch);
            if patch.status == Some(JobStatus::Applied) && rec.stamp_applied(now) {
                debug!(id, "stamped date applied");
            }
            Ok(Edit::Changed(Some(rec.clone())))
        })
    }

    /// Returns whether a record was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.modify(|jobs, _| {
            let before = jobs.len();
            jobs.retain(|j| j.id != id);
            if jobs.len() == before {
                debug!(id, "delete of unknown job ignored");
                Ok(Edit::Unchanged(false))
            } else {
                Ok(Edit::Changed(true))
            }
        })
    }

    pub fn compute_stats(&self) -> Result<Stats> {
        Ok(Stats::from_records(&self.list_all()?))
    }

    fn load(&self) -> Result<(Vec<JobRecord>, Option<Revision>)> {
        match self.kv.get(&self.opts.storage_key)? {
            Some(v) => {
                let jobs: Vec<JobRecord> = serde_json::from_slice(&v.bytes).map_err(|e| {
                    ApplyFlowError::Format(format!("{}: {e}", self.opts.storage_key))
                })?;
                Ok((jobs, Some(v.revision)))
            }
            None => Ok((Vec::new(), None)),
        }
    }

    fn modify<T>(
        &self,
        mut edit: impl FnMut(&mut Vec<JobRecord>, OffsetDateTime) -> Result<Edit<T>>,
    ) -> Result<T> {
        let attempts = self.opts.max_retries.max(1);
        for attempt in 1..=attempts {
            let (mut jobs, revision) = self.load()?;
            let now = (self.clock)();
            let out = match edit(&mut jobs, now)? {
                Edit::Unchanged(out) => return Ok(out),
                Edit::Changed(out) => out,
            };
            let bytes = serde_json::to_vec(&jobs)?;
            if self
                .kv
                .compare_and_swap(&self.opts.storage_key, revision, &bytes)?
            {
                return Ok(out);
            }
            warn!(attempt, key = %self.opts.storage_key, "job list changed underneath us, retrying");
        }
        Err(ApplyFlowError::Conflict {
            key: self.opts.storage_key.clone(),
            attempts,
        })
    }
}

fn new_id() -> Result<String> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf).map_err(|e| std::io::Error::other(format!("getrandom: {e}")))?;
    Ok(hex::encode(buf))
}
