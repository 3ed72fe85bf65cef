use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, view, HttpGateway, ScoreTracker, SelectedFile, StatusSnapshot, TrackerError,
};
use shared::domain::ScoreId;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "score-tracker", about = "Upload score screenshots and browse the history")]
struct Args {
    /// Overrides the gateway url from score_tracker.toml / GATEWAY_URL.
    #[arg(long)]
    gateway_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the score history.
    Scores,
    /// Process a screenshot and show the refreshed history.
    Upload { file: PathBuf },
    /// Correct the scenario and score of an existing record.
    Amend {
        id: i64,
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        score: i64,
    },
}

fn print_status(status: &StatusSnapshot) {
    println!("Status: {}", status.status);
    if let Some(error) = &status.error {
        println!("Error: {error}");
    }
}

fn print_scores(tracker: &ScoreTracker) {
    let rows = view::local_rows(&tracker.scores());
    print!("{}", view::render_table(&rows));
}

fn report(result: Result<(), TrackerError>) {
    if let Err(err) = result {
        debug!("workflow step failed: {err}");
        if err.is_busy() {
            println!("Error: {err}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(gateway_url) = args.gateway_url.as_deref() {
        settings = settings.with_gateway_url(gateway_url)?;
    }
    let tracker = ScoreTracker::over_http(HttpGateway::from_settings(&settings)?);

    report(tracker.mount().await.map(|_| ()));

    match args.command.unwrap_or(Command::Scores) {
        Command::Scores => {}
        Command::Upload { file } => {
            tracker.file_selected(SelectedFile::from_path(file)).await;
            let result = tracker.submit_requested().await.map(|outcome| {
                if let Some(found) = outcome.receipt.scores_found {
                    println!("Scores found in image: {found}");
                }
            });
            report(result);
        }
        Command::Amend {
            id,
            scenario,
            score,
        } => {
            report(
                tracker
                    .amend_score(ScoreId(id), scenario, score)
                    .await
                    .map(|_| ()),
            );
        }
    }

    print_status(&tracker.status());
    print_scores(&tracker);
    Ok(())
}
