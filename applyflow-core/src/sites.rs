//! Canonical registry of supported job boards.
//!
//! Both the activation gate (`is_supported`, `activation_patterns`) and the
//! extractor dispatch (`match_site`) read this one table. Adding a board is a
//! new `SiteRule` entry; nothing else changes.

use url::Url;

#[derive(Debug)]
pub struct SiteRule {
    pub id: &'static str,
    pub name: &'static str,
    /// `*.example.com` matches `example.com` and every subdomain; anything else is exact.
    pub hosts: &'static [&'static str],
    /// Segment-aware: `/jobs` matches `/jobs` and `/jobs/...`, not `/jobsearch`.
    pub path_prefix: Option<&'static str>,
    /// Tried in order, most stable first.
    pub title_selectors: &'static [&'static str],
    pub company_selectors: &'static [&'static str],
}

pub static SITES: &[SiteRule] = &[
    SiteRule {
        id: "linkedin",
        name: "LinkedIn",
        hosts: &["*.linkedin.com"],
        path_prefix: Some("/jobs"),
        title_selectors: &[
            ".job-details-jobs-unified-top-card__job-title",
            ".jobs-unified-top-card__job-title",
            "h1.top-card-layout__title",
            "h1.t-24",
        ],
        company_selectors: &[
            ".job-details-jobs-unified-top-card__company-name",
            ".jobs-unified-top-card__company-name",
            ".jobs-unified-top-card__subtitle-primary-grouping a",
            "a[data-tracking-control-name=\"public_jobs_topcard-org-name\"]",
        ],
    },
    SiteRule {
        id: "indeed",
        name: "Indeed",
        hosts: &["*.indeed.com", "*.indeed.ca"],
        path_prefix: None,
        title_selectors: &[
            ".jobsearch-JobInfoHeader-title",
            "h1.jobsearch-JobInfoHeader-title-container",
            "h1[class*=\"jobsearch-JobInfoHeader\"]",
        ],
        company_selectors: &[
            "[data-company-name=\"true\"]",
            ".jobsearch-InlineCompanyRating-companyHeader",
            "div[data-testid=\"inlineHeader-companyName\"]",
            ".jobsearch-CompanyInfoContainer a",
        ],
    },
    SiteRule {
        id: "wellfound",
        name: "Wellfound",
        hosts: &["*.wellfound.com"],
        path_prefix: None,
        title_selectors: &[
            "[data-test=\"JobDetail-title\"]",
            "[itemprop=\"title\"]",
            "h1",
        ],
        company_selectors: &[
            "[data-test=\"StartupLink\"]",
            "[itemprop=\"hiringOrganization\"] [itemprop=\"name\"]",
            "a[href^=\"/company/\"]",
        ],
    },
    SiteRule {
        id: "angellist",
        name: "AngelList",
        hosts: &["*.angel.co"],
        path_prefix: None,
        title_selectors: &[
            "[data-test=\"JobDetail-title\"]",
            "[itemprop=\"title\"]",
            "h1",
        ],
        company_selectors: &[
            "[data-test=\"StartupLink\"]",
            "[itemprop=\"hiringOrganization\"] [itemprop=\"name\"]",
            "a[href^=\"/company/\"]",
        ],
    },
    SiteRule {
        id: "builtin",
        name: "Built In",
        hosts: &["*.builtin.com"],
        path_prefix: None,
        title_selectors: &[
            "[data-id=\"job-title\"]",
            "[itemprop=\"title\"]",
            "h1",
        ],
        company_selectors: &[
            "[data-id=\"company-title\"]",
            "[itemprop=\"hiringOrganization\"] [itemprop=\"name\"]",
            "a[href*=\"/company/\"]",
        ],
    },
    SiteRule {
        id: "ziprecruiter",
        name: "ZipRecruiter",
        hosts: &["*.ziprecruiter.com"],
        path_prefix: None,
        title_selectors: &[
            "[data-testid=\"job-title\"]",
            ".job_title",
            "h1",
        ],
        company_selectors: &[
            "[data-testid=\"job-company\"]",
            ".hiring_company_text a",
            "a.hiring_company",
            "[itemprop=\"hiringOrganization\"] [itemprop=\"name\"]",
        ],
    },
    SiteRule {
        id: "workopolis",
        name: "Workopolis",
        hosts: &["*.workopolis.com"],
        path_prefix: None,
        title_selectors: &[
            "[data-testid=\"viewJobTitle\"]",
            "[itemprop=\"title\"]",
            "h1",
        ],
        company_selectors: &[
            "[data-testid=\"viewJobCompanyName\"]",
            "[itemprop=\"hiringOrganization\"] [itemprop=\"name\"]",
            ".viewjob-company",
        ],
    },
    SiteRule {
        id: "jobbank",
        name: "Job Bank",
        hosts: &["*.jobbank.gc.ca"],
        path_prefix: None,
        title_selectors: &[
            "[property=\"title\"]",
            "h1 .title",
            "h1",
        ],
        company_selectors: &[
            "[property=\"hiringOrganization\"] [property=\"name\"]",
            ".job-posting-brief .business",
            "span.business",
        ],
    },
    SiteRule {
        id: "dice",
        name: "Dice",
        hosts: &["*.dice.com"],
        path_prefix: None,
        title_selectors: &[
            "[data-cy=\"jobTitle\"]",
            "h1[data-testid=\"jobTitle\"]",
            "h1",
        ],
        company_selectors: &[
            "[data-cy=\"companyNameLink\"]",
            "a[data-testid=\"companyNameLink\"]",
            "[itemprop=\"hiringOrganization\"] [itemprop=\"name\"]",
        ],
    },
    SiteRule {
        id: "glassdoor",
        name: "Glassdoor",
        hosts: &["*.glassdoor.com", "*.glassdoor.ca"],
        path_prefix: None,
        title_selectors: &[
            "[data-test=\"job-title\"]",
            "h1[id^=\"jd-job-title\"]",
            "h1",
        ],
        company_selectors: &[
            "[data-test=\"employer-name\"]",
            "[data-test=\"employerName\"]",
            "[class*=\"EmployerProfile_employerName\"]",
        ],
    },
];

impl SiteRule {
    pub fn matches(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        if !self.hosts.iter().any(|p| host_matches(p, &host)) {
            return false;
        }
        match self.path_prefix {
            Some(prefix) => path_matches(prefix, url.path()),
            None => true,
        }
    }

    /// Browser-style match patterns, e.g. `https://*.linkedin.com/jobs/*`.
    pub fn patterns(&self) -> impl Iterator<Item = String> + '_ {
        let path = match self.path_prefix {
            Some(p) => format!("{}/*", p.trim_end_matches('/')),
            None => "/*".to_string(),
        };
        self.hosts
            .iter()
            .map(move |h| format!("https://{h}{path}"))
    }
}

fn host_matches(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(domain) => {
            host == domain
                || (host.len() > domain.len()
                    && host.ends_with(domain)
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
        }
        None => host == pattern,
    }
}

fn path_matches(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn match_site(url: &Url) -> Option<&'static SiteRule> {
    SITES.iter().find(|s| s.matches(url))
}

/// Activation gate: the page is one the extractor knows how to read.
pub fn is_supported(url: &str) -> bool {
    Url::parse(url).ok().and_then(|u| match_site(&u)).is_some()
}

pub fn activation_patterns() -> Vec<String> {
    SITES.iter().flat_map(|s| s.patterns()).collect()
}
