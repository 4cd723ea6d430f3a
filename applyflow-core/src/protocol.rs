//! Request/response messages exchanged between the control surface and the
//! page context, e.g. `{"action":"extractJobData"}` ->
//! `{"success":true,"data":{...}}`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{JobData, JobDraft, JobRecord};
use crate::error::ApplyFlowError;
use crate::extract::{self, PageDom};
use crate::store::JobStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ExtractJobData,
    SaveJob { data: JobData },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Saved(JobRecord),
    Job(JobData),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable failure kind, see `ExtractionFailure::code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Response {
    pub fn ok(data: ResponseData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            reason: None,
        }
    }

    pub fn fail(reason: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            reason: Some(reason.to_string()),
        }
    }
}

/// Serves one request. Failures come back as `success: false`, never as `Err`.
pub fn handle(request: &Request, page: &dyn PageDom, url: &str, store: &JobStore) -> Response {
    debug!(?request, url, "handling message");
    match request {
        Request::ExtractJobData => match extract::extract(page, url) {
            Ok(job) => Response::ok(ResponseData::Job(job)),
            Err(f) => Response::fail(f.code(), f.to_string()),
        },
        Request::SaveJob { data } => match store.save(JobDraft::from(data.clone())) {
            Ok(rec) => Response::ok(ResponseData::Saved(rec)),
            Err(e @ ApplyFlowError::InvalidJob(_)) => Response::fail("invalidJob", e.to_string()),
            Err(e) => Response::fail("storage", e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HtmlPage;
    use crate::kv_mem::MemKvStore;
    use crate::options::StoreOptions;
    use std::sync::Arc;

    fn store() -> JobStore {
        JobStore::new(Arc::new(MemKvStore::new()), StoreOptions::default())
    }

    #[test]
    fn request_wire_format() {
        let r: Request = serde_json::from_str(r#"{"action":"extractJobData"}"#).unwrap();
        assert_eq!(r, Request::ExtractJobData);
        let r: Request = serde_json::from_str(
            r#"{"action":"saveJob","data":{"title":"T","company":"C","url":"https://x.test"}}"#,
        )
        .unwrap();
        assert!(matches!(r, Request::SaveJob { .. }));
        assert!(serde_json::from_str::<Request>(r#"{"action":"dance"}"#).is_err());
    }

    #[test]
    fn extract_success_response() {
        let page = HtmlPage::parse(
            r#"<html><body><h1 class="jobsearch-JobInfoHeader-title">QA Lead</h1>
            <span data-company-name="true">Acme</span></body></html>"#,
        );
        let resp = handle(
            &Request::ExtractJobData,
            &page,
            "https://www.indeed.com/viewjob?jk=42",
            &store(),
        );
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["title"], "QA Lead");
        assert_eq!(v["data"]["company"], "Acme");
        assert!(v.get("error").is_none());
    }

    #[test]
    fn extract_failure_carries_reason() {
        let page = HtmlPage::parse("<html><body><p>hi</p></body></html>");
        let resp = handle(&Request::ExtractJobData, &page, "https://example.org/", &store());
        assert!(!resp.success);
        assert_eq!(resp.reason.as_deref(), Some("unsupportedSite"));
        assert!(resp.error.unwrap().contains("example.org"));
    }

    #[test]
    fn save_job_persists() {
        let s = store();
        let page = HtmlPage::parse("");
        let req = Request::SaveJob {
            data: JobData {
                title: "Dev".into(),
                company: "Acme".into(),
                url: "https://x.test/1".into(),
            },
        };
        let resp = handle(&req, &page, "", &s);
        assert!(resp.success);
        assert!(matches!(resp.data, Some(ResponseData::Saved(_))));
        assert_eq!(s.list_all().unwrap().len(), 1);

        let bad = Request::SaveJob {
            data: JobData {
                title: " ".into(),
                company: "Acme".into(),
                url: "https://x.test/2".into(),
            },
        };
        let resp = handle(&bad, &page, "", &s);
        assert_eq!(resp.reason.as_deref(), Some("invalidJob"));
    }
}
