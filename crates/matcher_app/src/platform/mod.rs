mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod ui;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use matcher_core::{IngestStatus, Msg, ProgressPhase, SearchPhase};
use matcher_engine::BlockingApi;
use matcher_logging::level_for_verbosity;

use cli::{Cli, Command};
use logging::{LogDestination, DEFAULT_LOG_FILE};
use ui::render::Section;

const SEARCH_SECTIONS: &[Section] = &[Section::Results];
const INGEST_SECTIONS: &[Section] = &[Section::Ingest, Section::Progress];
const WATCH_SECTIONS: &[Section] = &[Section::Progress];

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let destination = match (cli.is_interactive(), cli.log_file.clone()) {
        (true, path) => LogDestination::File(path.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))),
        (false, Some(path)) => LogDestination::Both(path),
        (false, None) => LogDestination::Stderr,
    };
    logging::initialize(destination, level_for_verbosity(cli.verbose));

    let mut config = config::load(&cli.config);
    if let Some(api_url) = cli.api_url.clone() {
        config.api_base_url = api_url;
    }
    let client = config.client_settings();
    let settings = config.app_settings();

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => app::run_interactive(settings, &client),
        Command::Search {
            profile,
            limit,
            score,
        } => {
            let mut initial = Vec::new();
            if let Some(limit) = limit {
                initial.push(Msg::LimitChanged(limit));
            }
            if let Some(score) = score {
                initial.push(Msg::ScoreThresholdChanged(score));
            }
            initial.push(Msg::ProfileTextChanged(profile.join(" ")));
            initial.push(Msg::SearchClicked);

            let view = app::run_until(settings, &client, SEARCH_SECTIONS, initial, |view| {
                !matches!(view.search.phase, SearchPhase::Idle | SearchPhase::Loading)
            })?;
            if let SearchPhase::Failed(message) = view.search.phase {
                bail!(message);
            }
            Ok(())
        }
        Command::Ingest {
            university,
            dept_url,
            follow,
        } => {
            let initial = vec![
                Msg::UniversityChanged(university),
                Msg::DeptUrlChanged(dept_url),
                Msg::IngestClicked,
            ];
            let view = app::run_until(settings, &client, INGEST_SECTIONS, initial, |view| {
                match &view.ingest_status {
                    IngestStatus::Failed(_) => true,
                    IngestStatus::Queued { .. } => !follow || view.progress.phase.is_terminal(),
                    IngestStatus::Idle | IngestStatus::Triggering => false,
                }
            })?;
            if let IngestStatus::Failed(message) = view.ingest_status {
                bail!(message);
            }
            check_progress(view.progress.phase)
        }
        Command::Watch { job_id } => {
            let view = app::run_until(
                settings,
                &client,
                WATCH_SECTIONS,
                vec![Msg::WatchJob(job_id)],
                |view| view.progress.phase.is_terminal(),
            )?;
            check_progress(view.progress.phase)
        }
        Command::Health => {
            let api = BlockingApi::new(&client).context("failed to start client")?;
            let health = api
                .health()
                .with_context(|| format!("backend at {} is unreachable", client.base_url))?;
            if !health.is_ok() {
                bail!("backend reported status {:?}", health.status);
            }
            println!("Backend at {} is healthy.", client.base_url);
            Ok(())
        }
        Command::Export { out } => {
            let api = BlockingApi::new(&client).context("failed to start client")?;
            let output = api.export_professors(&out)?;
            println!(
                "Saved {} ({} bytes).",
                output.path.display(),
                output.byte_len
            );
            Ok(())
        }
    }
}

fn check_progress(phase: ProgressPhase) -> anyhow::Result<()> {
    if phase == ProgressPhase::Stalled {
        bail!("gave up polling after repeated failures");
    }
    Ok(())
}
