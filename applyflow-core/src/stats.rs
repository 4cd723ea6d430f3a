use serde::{Deserialize, Serialize};

use crate::domain::{JobRecord, JobStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: u64,
    /// Records that progressed past `saved`.
    pub applied: u64,
    pub interviews: u64,
    pub offers: u64,
    pub rejected: u64,
    pub response_rate: String,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total: 0,
            applied: 0,
            interviews: 0,
            offers: 0,
            rejected: 0,
            response_rate: response_rate(0, 0),
        }
    }
}

impl Stats {
    pub fn from_records(records: &[JobRecord]) -> Self {
        let mut s = Stats::default();
        for r in records {
            s.total += 1;
            if r.status.has_progressed() {
                s.applied += 1;
            }
            match r.status {
                JobStatus::Interview => s.interviews += 1,
                JobStatus::Offer => s.offers += 1,
                JobStatus::Rejected => s.rejected += 1,
                JobStatus::Saved | JobStatus::Applied => {}
            }
        }
        s.response_rate = response_rate(s.interviews + s.offers, s.applied);
        s
    }
}

/// `responded / applied` as a percentage with one decimal, `0%` when nothing was applied to.
pub fn response_rate(responded: u64, applied: u64) -> String {
    if applied == 0 {
        return "0%".to_string();
    }
    let pct = responded as f64 / applied as f64 * 100.0;
    format!("{pct:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn rec(i: usize, status: JobStatus) -> JobRecord {
        JobRecord {
            id: format!("id-{i}"),
            title: format!("Role {i}"),
            company: "Acme".into(),
            url: format!("https://jobs.test/{i}"),
            status,
            date_saved: datetime!(2024-01-01 00:00 UTC),
            date_applied: None,
            notes: None,
        }
    }

    #[test]
    fn empty_store_has_zero_rate() {
        let s = Stats::from_records(&[]);
        assert_eq!(s, Stats::default());
        assert_eq!(s.response_rate, "0%");
    }

    #[test]
    fn progressed_statuses_count_as_applied() {
        let statuses = [
            JobStatus::Applied,
            JobStatus::Applied,
            JobStatus::Interview,
            JobStatus::Offer,
            JobStatus::Rejected,
        ];
        let recs: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| rec(i, *s))
            .collect();
        let s = Stats::from_records(&recs);
        assert_eq!(s.total, 5);
        assert_eq!(s.applied, 5);
        assert_eq!(s.interviews, 1);
        assert_eq!(s.offers, 1);
        assert_eq!(s.rejected, 1);
        assert_eq!(s.response_rate, "40.0%");
    }

    #[test]
    fn saved_jobs_do_not_dilute_the_rate() {
        let recs = vec![
            rec(0, JobStatus::Saved),
            rec(1, JobStatus::Saved),
            rec(2, JobStatus::Applied),
            rec(3, JobStatus::Interview),
            rec(4, JobStatus::Applied),
        ];
        let s = Stats::from_records(&recs);
        assert_eq!(s.total, 5);
        assert_eq!(s.applied, 3);
        assert_eq!(s.response_rate, "33.3%");
    }

    #[test]
    fn serializes_camel_case() {
        let v = serde_json::to_value(Stats::default()).unwrap();
        assert_eq!(v["responseRate"], "0%");
    }
}
