#![forbid(unsafe_code)]

pub mod error;
pub mod options;

pub mod domain;
pub mod sites;
pub mod stats;

pub mod extract;

pub mod kv;
pub mod kv_factory;
pub mod kv_fs;
pub mod kv_mem;

pub mod protocol;
pub mod store;

// Re-exports: stable API surface
pub use domain::{JobData, JobDraft, JobPatch, JobRecord, JobStatus};
pub use extract::{ExtractionFailure, HtmlPage, PageDom, extract};
pub use kv_factory::{Backend, open_kv};
pub use options::StoreOptions;
pub use stats::Stats;
pub use store::JobStore;
