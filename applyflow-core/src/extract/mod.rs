//! Site-adaptive extraction of job posting metadata.

pub mod page;

use std::fmt;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::{JobData, canonical_url};
use crate::sites::{self, SiteRule};

pub use page::{HtmlPage, PageDom};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingField {
    Title,
    Company,
    Both,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingField::Title => "job title",
            MissingField::Company => "company name",
            MissingField::Both => "job title and company name",
        })
    }
}

/// Why a page could not be turned into `JobData`. Not an error: callers show it and move on.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("invalid page url: {0}")]
    InvalidUrl(String),

    #[error("unsupported site: {host}")]
    UnsupportedSite { host: String },

    #[error("page content has not loaded yet")]
    NotReady,

    #[error("could not find the {missing} on this {site} page")]
    MissingFields {
        site: &'static str,
        missing: MissingField,
    },
}

impl ExtractionFailure {
    /// Only a page that was still loading is worth trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractionFailure::NotReady)
    }

    /// Stable machine code for the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionFailure::InvalidUrl(_) => "invalidUrl",
            ExtractionFailure::UnsupportedSite { .. } => "unsupportedSite",
            ExtractionFailure::NotReady => "notReady",
            ExtractionFailure::MissingFields { .. } => "missingFields",
        }
    }
}

pub fn extract(page: &dyn PageDom, current_url: &str) -> Result<JobData, ExtractionFailure> {
    let url = Url::parse(current_url.trim())
        .map_err(|e| ExtractionFailure::InvalidUrl(format!("{current_url}: {e}")))?;
    let Some(site) = sites::match_site(&url) else {
        return Err(ExtractionFailure::UnsupportedSite {
            host: url.host_str().unwrap_or_default().to_string(),
        });
    };
    extract_with(site, page, &url)
}

/// Runs one site's selector chains against the page.
pub fn extract_with(
    site: &'static SiteRule,
    page: &dyn PageDom,
    url: &Url,
) -> Result<JobData, ExtractionFailure> {
    if !page.is_loaded() {
        return Err(ExtractionFailure::NotReady);
    }

    let title = first_text(page, site.title_selectors);
    let company = first_text(page, site.company_selectors);
    debug!(
        site = site.id,
        title = title.as_deref().unwrap_or(""),
        company = company.as_deref().unwrap_or(""),
        "extracted fields"
    );

    match (title, company) {
        (Some(title), Some(company)) => Ok(JobData {
            title,
            company,
            url: canonical_url(url.as_str()),
        }),
        (None, Some(_)) => Err(missing(site, MissingField::Title)),
        (Some(_), None) => Err(missing(site, MissingField::Company)),
        (None, None) => Err(missing(site, MissingField::Both)),
    }
}

fn missing(site: &SiteRule, field: MissingField) -> ExtractionFailure {
    ExtractionFailure::MissingFields {
        site: site.name,
        missing: field,
    }
}

fn first_text(page: &dyn PageDom, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|sel| page.query_text(sel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingPage {
        inner: HtmlPage,
        queries: Cell<usize>,
    }

    impl CountingPage {
        fn new(html: &str) -> Self {
            Self {
                inner: HtmlPage::parse(html),
                queries: Cell::new(0),
            }
        }
    }

    impl PageDom for CountingPage {
        fn is_loaded(&self) -> bool {
            self.queries.set(self.queries.get() + 1);
            self.inner.is_loaded()
        }
        fn query_text(&self, selector: &str) -> Option<String> {
            self.queries.set(self.queries.get() + 1);
            self.inner.query_text(selector)
        }
    }

    const LINKEDIN_URL: &str = "https://www.linkedin.com/jobs/view/4012345678/";

    #[test]
    fn linkedin_primary_selectors() {
        let page = HtmlPage::parse(
            r#"<html><body>
            <h1 class="job-details-jobs-unified-top-card__job-title">  Backend Engineer </h1>
            <div class="job-details-jobs-unified-top-card__company-name"><a>Ferris Labs</a></div>
            </body></html>"#,
        );
        let d = extract(&page, LINKEDIN_URL).unwrap();
        assert_eq!(d.title, "Backend Engineer");
        assert_eq!(d.company, "Ferris Labs");
        assert_eq!(d.url, LINKEDIN_URL);
    }

    #[test]
    fn falls_back_when_primary_selector_is_absent() {
        let page = HtmlPage::parse(
            r#"<html><body>
            <h1 class="t-24">
                Platform Engineer
            </h1>
            <a data-tracking-control-name="public_jobs_topcard-org-name">Crab Corp</a>
            </body></html>"#,
        );
        let d = extract(&page, LINKEDIN_URL).unwrap();
        assert_eq!(d.title, "Platform Engineer");
        assert_eq!(d.company, "Crab Corp");
    }

    #[test]
    fn blank_primary_falls_through_to_next_selector() {
        let page = HtmlPage::parse(
            r#"<html><body>
            <h1 class="jobsearch-JobInfoHeader-title">   </h1>
            <h1 class="jobsearch-JobInfoHeader-title-container">Data Analyst</h1>
            <div data-testid="inlineHeader-companyName"><a>Acme</a></div>
            </body></html>"#,
        );
        let d = extract(&page, "https://ca.indeed.com/viewjob?jk=abc").unwrap();
        assert_eq!(d.title, "Data Analyst");
        assert_eq!(d.company, "Acme");
    }

    #[test]
    fn unsupported_host_touches_no_dom() {
        let page = CountingPage::new("<html><body><h1>Anything</h1></body></html>");
        let err = extract(&page, "https://careers.example.com/jobs/1").unwrap_err();
        assert_eq!(
            err,
            ExtractionFailure::UnsupportedSite {
                host: "careers.example.com".into()
            }
        );
        assert_eq!(page.queries.get(), 0);
        assert!(!err.is_retryable());
    }

    #[test]
    fn unloaded_page_is_retryable() {
        let page = HtmlPage::parse("<html><head></head><body></body></html>");
        let err = extract(&page, LINKEDIN_URL).unwrap_err();
        assert_eq!(err, ExtractionFailure::NotReady);
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_company_is_a_structural_failure() {
        let page = HtmlPage::parse(
            r#"<html><body><h1 class="jobs-unified-top-card__job-title">SRE</h1></body></html>"#,
        );
        let err = extract(&page, LINKEDIN_URL).unwrap_err();
        assert_eq!(
            err,
            ExtractionFailure::MissingFields {
                site: "LinkedIn",
                missing: MissingField::Company
            }
        );
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "missingFields");
    }

    #[test]
    fn nothing_found_reports_both_fields() {
        let page = HtmlPage::parse("<html><body><p>Sign in to continue</p></body></html>");
        let err = extract(&page, "https://www.glassdoor.com/job-listing/x").unwrap_err();
        assert!(matches!(
            err,
            ExtractionFailure::MissingFields {
                missing: MissingField::Both,
                ..
            }
        ));
    }

    #[test]
    fn invalid_url_is_reported() {
        let page = HtmlPage::parse("<html><body><h1>x</h1></body></html>");
        let err = extract(&page, "not a url").unwrap_err();
        assert_eq!(err.code(), "invalidUrl");
    }

    #[test]
    fn generic_h1_fallback_on_dice() {
        let page = HtmlPage::parse(
            r#"<html><body><h1>Embedded Developer</h1>
            <a data-cy="companyNameLink">Widget Works</a></body></html>"#,
        );
        let d = extract(&page, "https://www.dice.com/job-detail/abc").unwrap();
        assert_eq!(d.title, "Embedded Developer");
        assert_eq!(d.company, "Widget Works");
    }
}
