mod cli;
mod config;
mod error;
mod orchestrator;
mod output;
mod request;
mod shom;
mod state_machine;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use console::Term;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::MareesConfig;
use orchestrator::{DownloadPlan, TideOrchestrator};
use request::DateRange;
use shom::ShomClient;
use ui::{LogWriter, PollProgress};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let progress = PollProgress::for_mode(cli.debug, Term::stderr().is_term());
    init_tracing(cli.debug, progress.log_writer());

    match run(cli, progress.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            progress.clear();
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool, writer: LogWriter) {
    let default_level = if debug { "marees=debug" } else { "marees=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();
    debug!("debug logging enabled");
}

async fn run(cli: Cli, progress: PollProgress) -> Result<()> {
    let config = MareesConfig::load(cli.config.as_deref())?;
    let today = Local::now().date_naive();
    let range = DateRange::parse(cli.debut.as_deref(), cli.fin.as_deref(), today)?;

    let output_dir = config.output_dir_for(cli.output_dir);
    let plan = DownloadPlan::new(config.station_id, &config.station_name, range, &output_dir);
    progress.set_message(&format!(
        "{} {}",
        config.station_name,
        plan.output.display()
    ));

    let client = ShomClient::with_base_url(
        config.base_url.clone(),
        config.connect_timeout(),
        config.request_timeout(),
    )?;
    let orchestrator = TideOrchestrator::with_progress(client, config.poll_config(), progress);

    let report = orchestrator.run(&plan).await?;
    if cli.debug {
        eprintln!("{}", ui::render_report(&report));
    }
    Ok(())
}
