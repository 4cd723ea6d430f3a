pub mod handlers;

use std::process::ExitCode;

use crate::presentation::cli::{Cli, Commands};
use applyflow_core::error::Result;
use clap::Parser;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir;
    let done = match cli.command {
        Commands::Extract { html, url } => {
            return handlers::handle_extract(html, url).map(ExitCode::from);
        }
        Commands::Save { html, url } => {
            return handlers::handle_save(data_dir, html, url).map(ExitCode::from);
        }
        Commands::Add {
            title,
            company,
            url,
            status,
        } => handlers::handle_add(data_dir, title, company, url, status),
        Commands::List { long, status, json } => handlers::handle_list(data_dir, long, status, json),
        Commands::Status { id, status } => handlers::handle_status(data_dir, id, status),
        Commands::Note { id, text } => handlers::handle_note(data_dir, id, text),
        Commands::Rm { id } => handlers::handle_rm(data_dir, id),
        Commands::Stats { json } => handlers::handle_stats(data_dir, json),
        Commands::Sites => handlers::handle_sites(),
        Commands::Message { request, html, url } => {
            handlers::handle_message(data_dir, request, html, url)
        }
    };
    done.map(|()| ExitCode::SUCCESS)
}
