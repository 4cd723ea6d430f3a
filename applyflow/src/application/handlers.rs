use std::io::Read;
use std::path::{Path, PathBuf};

use applyflow_core::domain::short_date;
use applyflow_core::error::Result;
use applyflow_core::protocol::{self, Request};
use applyflow_core::sites;
use applyflow_core::{
    Backend, HtmlPage, JobDraft, JobPatch, JobRecord, JobStatus, JobStore, StoreOptions, extract,
    open_kv,
};
use tracing::debug;

/// Exit status when the page could not be turned into a job.
pub const EXIT_EXTRACTION_FAILED: u8 = 2;

fn store_from_args(data_dir: PathBuf) -> Result<JobStore> {
    let opts = StoreOptions::default();
    debug!(data_dir = %data_dir.display(), "opening job store");
    let kv = open_kv(Backend::Fs(data_dir), &opts)?;
    Ok(JobStore::new(kv, opts))
}

fn read_html(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut s = String::new();
        std::io::stdin().lock().read_to_string(&mut s)?;
        return Ok(s);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Accepts a full id or a prefix matching exactly one job.
fn resolve_id(store: &JobStore, id: &str) -> Result<String> {
    let jobs = store.list_all()?;
    if jobs.iter().any(|j| j.id == id) {
        return Ok(id.to_string());
    }
    let mut hits = jobs.iter().filter(|j| j.id.starts_with(id));
    match (hits.next(), hits.next()) {
        (Some(j), None) => Ok(j.id.clone()),
        _ => Ok(id.to_string()),
    }
}

fn print_row(j: &JobRecord, long: bool) {
    println!(
        "{:.8}  {} {:<9}  {} @ {}",
        j.id,
        j.status.emoji(),
        j.status.label(),
        j.title,
        j.company
    );
    if long {
        let applied = j
            .date_applied
            .map(|d| format!("  applied {}", short_date(d)))
            .unwrap_or_default();
        println!("          saved {}{}", short_date(j.date_saved), applied);
        println!("          {}", j.url);
        if let Some(n) = &j.notes {
            println!("          note: {n}");
        }
    }
}

pub fn handle_extract(html: PathBuf, url: String) -> Result<u8> {
    let page = HtmlPage::parse(&read_html(&html)?);
    match extract(&page, &url) {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(0)
        }
        Err(f) => {
            eprintln!("extract: {f}");
            Ok(EXIT_EXTRACTION_FAILED)
        }
    }
}

pub fn handle_save(data_dir: PathBuf, html: PathBuf, url: String) -> Result<u8> {
    if !sites::is_supported(&url) {
        eprintln!("Please navigate to a job posting on a supported job site");
        return Ok(EXIT_EXTRACTION_FAILED);
    }
    let page = HtmlPage::parse(&read_html(&html)?);
    let data = match extract(&page, &url) {
        Ok(d) => d,
        Err(f) => {
            eprintln!("Unable to extract job data from this page: {f}");
            if f.is_retryable() {
                eprintln!("The page may still have been loading; capture it again and retry.");
            }
            return Ok(EXIT_EXTRACTION_FAILED);
        }
    };
    let store = store_from_args(data_dir)?;
    let rec = store.save(data.into())?;
    eprintln!("Job saved successfully!");
    print_row(&rec, false);
    Ok(0)
}

pub fn handle_add(
    data_dir: PathBuf,
    title: String,
    company: String,
    url: String,
    status: JobStatus,
) -> Result<()> {
    let store = store_from_args(data_dir)?;
    let rec = store.save(JobDraft::new(title, company, url).with_status(status))?;
    eprintln!("Job saved successfully!");
    print_row(&rec, false);
    Ok(())
}

pub fn handle_list(
    data_dir: PathBuf,
    long: bool,
    status: Option<JobStatus>,
    json: bool,
) -> Result<()> {
    let store = store_from_args(data_dir)?;
    let jobs: Vec<JobRecord> = store
        .list_all()?
        .into_iter()
        .filter(|j| status.is_none_or(|s| j.status == s))
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }
    if jobs.is_empty() {
        eprintln!("No jobs saved yet");
        return Ok(());
    }
    for j in &jobs {
        print_row(j, long);
    }
    Ok(())
}

pub fn handle_status(data_dir: PathBuf, id: String, status: JobStatus) -> Result<()> {
    let store = store_from_args(data_dir)?;
    let id = resolve_id(&store, &id)?;
    match store.update(&id, &JobPatch::status(status))? {
        Some(rec) => {
            eprintln!("Status updated!");
            print_row(&rec, false);
        }
        None => eprintln!("status: no job with id {id}"),
    }
    Ok(())
}

pub fn handle_note(data_dir: PathBuf, id: String, text: String) -> Result<()> {
    let store = store_from_args(data_dir)?;
    let id = resolve_id(&store, &id)?;
    match store.update(&id, &JobPatch::notes(text))? {
        Some(rec) => print_row(&rec, true),
        None => eprintln!("note: no job with id {id}"),
    }
    Ok(())
}

pub fn handle_rm(data_dir: PathBuf, id: String) -> Result<()> {
    let store = store_from_args(data_dir)?;
    let id = resolve_id(&store, &id)?;
    if store.delete(&id)? {
        eprintln!("Job deleted");
    } else {
        eprintln!("rm: no job with id {id}");
    }
    Ok(())
}

pub fn handle_stats(data_dir: PathBuf, json: bool) -> Result<()> {
    let store = store_from_args(data_dir)?;
    let s = store.compute_stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }
    println!("{:>12}  Total Saved", s.total);
    println!("{:>12}  Applied", s.applied);
    println!("{:>12}  Response Rate", s.response_rate);
    println!(
        "{} Interviews  {} Offers  {} Rejected",
        s.interviews, s.offers, s.rejected
    );
    Ok(())
}

pub fn handle_sites() -> Result<()> {
    for p in sites::activation_patterns() {
        println!("{p}");
    }
    Ok(())
}

pub fn handle_message(
    data_dir: PathBuf,
    request: String,
    html: Option<PathBuf>,
    url: String,
) -> Result<()> {
    let req: Request = serde_json::from_str(&request)?;
    let page = match html {
        Some(p) => HtmlPage::parse(&read_html(&p)?),
        None => HtmlPage::parse(""),
    };
    let store = store_from_args(data_dir)?;
    let resp = protocol::handle(&req, &page, &url, &store);
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}
