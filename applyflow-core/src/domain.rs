// applyflow_core/src/domain.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;
use url::Url;

use crate::error::{ApplyFlowError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Saved,
    Applied,
    Interview,
    Rejected,
    Offer,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Saved,
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Rejected,
        JobStatus::Offer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Saved => "saved",
            JobStatus::Applied => "applied",
            JobStatus::Interview => "interview",
            JobStatus::Rejected => "rejected",
            JobStatus::Offer => "offer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Saved => "Saved",
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Rejected => "Rejected",
            JobStatus::Offer => "Offer",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            JobStatus::Saved => "💼",
            JobStatus::Applied => "✅",
            JobStatus::Interview => "🗓️",
            JobStatus::Rejected => "❌",
            JobStatus::Offer => "🎉",
        }
    }

    /// True once an application has been sent, whatever happened after.
    pub fn has_progressed(self) -> bool {
        !matches!(self, JobStatus::Saved)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ApplyFlowError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        JobStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| {
                ApplyFlowError::InvalidJob(format!(
                    "unknown status \"{s}\" (expected one of saved, applied, interview, rejected, offer)"
                ))
            })
    }
}

/// What the extractor pulls off a job posting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    pub title: String,
    pub company: String,
    pub url: String,
}

/// Save candidate handed to `JobStore::save`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub url: String,
    pub status: JobStatus,
}

impl JobDraft {
    pub fn new(title: impl Into<String>, company: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            url: url.into(),
            status: JobStatus::Saved,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Trims the text fields, canonicalizes the url and rejects blanks.
    pub fn validated(self) -> Result<Self> {
        let title = self.title.trim().to_string();
        let company = self.company.trim().to_string();
        let url = canonical_url(&self.url);
        if title.is_empty() {
            return Err(ApplyFlowError::InvalidJob("title must not be empty".into()));
        }
        if company.is_empty() {
            return Err(ApplyFlowError::InvalidJob("company must not be empty".into()));
        }
        if url.is_empty() {
            return Err(ApplyFlowError::InvalidJob("url must not be empty".into()));
        }
        Ok(Self {
            title,
            company,
            url,
            status: self.status,
        })
    }
}

impl From<JobData> for JobDraft {
    fn from(d: JobData) -> Self {
        JobDraft::new(d.title, d.company, d.url)
    }
}

/// Partial update. `None` leaves a field untouched; `Some("")` clears notes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.company.is_none() && self.status.is_none() && self.notes.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub url: String,
    pub status: JobStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub date_saved: OffsetDateTime,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub date_applied: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl JobRecord {
    /// Stamps `date_applied` the first time the record reaches `applied`.
    /// Returns whether the stamp was set.
    pub(crate) fn stamp_applied(&mut self, now: OffsetDateTime) -> bool {
        if self.status == JobStatus::Applied && self.date_applied.is_none() {
            self.date_applied = Some(now);
            return true;
        }
        false
    }

    /// Merges a patch in place; blank title/company values are ignored.
    pub(crate) fn apply_patch(&mut self, patch: &JobPatch) {
        if let Some(t) = patch.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            self.title = t.to_string();
        }
        if let Some(c) = patch.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            self.company = c.to_string();
        }
        if let Some(st) = patch.status {
            self.status = st;
        }
        if let Some(n) = &patch.notes {
            self.notes = if n.trim().is_empty() {
                None
            } else {
                Some(n.clone())
            };
        }
    }
}

/// Dedup key form of a job url: parsed and re-serialized, so
/// `https://www.indeed.com?jk=1` and `https://www.indeed.com/?jk=1` agree.
/// Strings that are not urls are only trimmed.
pub fn canonical_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(u) => u.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// `Mar 1, 2024`
pub fn short_date(dt: OffsetDateTime) -> String {
    dt.format(format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| dt.date().to_string())
}
