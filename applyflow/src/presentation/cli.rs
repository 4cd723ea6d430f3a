use applyflow_core::JobStatus;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "applyflow: job application tracker", long_about = None)]
pub struct Cli {
    /// Directory holding the job list
    #[arg(long, global = true, env = "APPLYFLOW_DATA_DIR", default_value = ".applyflow")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract title/company from a saved job posting page and print it as JSON
    Extract {
        /// HTML file of the page ("-" for stdin)
        html: PathBuf,
        /// URL the page was loaded from
        #[arg(long)]
        url: String,
    },

    /// Extract a job posting and save it (upserts by URL)
    Save {
        /// HTML file of the page ("-" for stdin)
        html: PathBuf,
        #[arg(long)]
        url: String,
    },

    /// Save a job by hand
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        url: String,
        #[arg(long, default_value_t = JobStatus::Saved)]
        status: JobStatus,
    },

    /// List saved jobs, most recent first
    List {
        /// show dates, url and notes
        #[arg(long)]
        long: bool,
        /// only jobs with this status
        #[arg(long)]
        status: Option<JobStatus>,
        /// print the raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a job to a new status
    Status {
        /// job id (a unique prefix is enough)
        id: String,
        status: JobStatus,
    },

    /// Set or clear (with "") the notes on a job
    Note { id: String, text: String },

    /// Delete a job
    Rm { id: String },

    /// Show totals and response rate
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// List supported job boards and their activation patterns
    Sites,

    /// Run one protocol message, e.g. '{"action":"extractJobData"}'
    Message {
        request: String,
        /// page HTML for extractJobData ("-" for stdin)
        #[arg(long)]
        html: Option<PathBuf>,
        #[arg(long, default_value = "")]
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_values() {
        let cli = Cli::try_parse_from(["applyflow", "status", "ab12", "interview"]).unwrap();
        match cli.command {
            Commands::Status { id, status } => {
                assert_eq!(id, "ab12");
                assert_eq!(status, JobStatus::Interview);
            }
            _ => panic!("wrong command"),
        }
        assert!(Cli::try_parse_from(["applyflow", "status", "ab12", "hired"]).is_err());
    }

    #[test]
    fn add_defaults_to_saved() {
        let cli = Cli::try_parse_from([
            "applyflow",
            "--data-dir",
            "/tmp/af",
            "add",
            "--title",
            "Dev",
            "--company",
            "Acme",
            "--url",
            "https://x.test/1",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/af"));
        assert!(matches!(
            cli.command,
            Commands::Add {
                status: JobStatus::Saved,
                ..
            }
        ));
    }
}
