mod app;
mod backend;
mod cli;
mod config;
mod logging;
mod runtime;
mod ui;

use anyhow::{Context, Result};
use app::App;
use backend::Backend;
use clap::Parser;
use cli::{Cli, Commands};
use config::TuiConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use timesheet_client::{DevBackend, HttpBackend};
use timesheet_core::WeekGridEngine;
use tracing::{error, info};

fn main() -> Result<()> {
    // Load environment variables from .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let dev_latency = match cli.command {
        Commands::ConfigPath => return print_config_path(),
        Commands::Run => None,
        Commands::Dev { latency_ms } => Some(Duration::from_millis(latency_ms)),
    };

    let config = TuiConfig::load()?;
    let log_path = logging::init()?;

    // The local offset can only be read while the process is single-threaded,
    // so resolve it before the runtime starts its workers.
    let reference = config.time_reference();
    let now = OffsetDateTime::now_utc();
    let engine = WeekGridEngine::new(reference, config.grid_settings()?);
    let workflow_settings = config.workflow_settings()?;

    let backend = match dev_latency {
        None => Backend::Http(HttpBackend::new(
            &config.api_url,
            config.api_token.as_deref(),
        )?),
        Some(latency) => Backend::Dev(DevBackend::new(reference.today(now)).with_latency(latency)),
    };
    info!(
        dev = backend.is_dev(),
        api_url = %config.api_url,
        ?reference,
        log = %log_path.display(),
        "starting timesheet-tui"
    );

    let mut app = App::new(Arc::new(backend), engine, workflow_settings, now);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Run the app
    let res = runtime.block_on(runtime::run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "timesheet-tui exited with an error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn print_config_path() -> Result<()> {
    let path = TuiConfig::config_path()?;
    if !path.exists() {
        TuiConfig::default().save()?;
        println!("Created default config:");
    }
    println!("{}", path.display());
    Ok(())
}
