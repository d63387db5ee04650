mod action;
mod app;
mod cli;
mod components;
mod config;
mod error;
mod input;
mod llm;
mod logging;
mod models;
mod state;
mod tabs;
mod util;

use color_eyre::eyre::Result;
use cli::Cli;
use config::ConfigManager;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse_args();

    let mut config = ConfigManager::new(cli.config_dir.clone())?;
    if let Some(level) = &cli.log_level {
        config.app_config_mut().general.log_level = level.clone();
    }
    if let Some(policy) = cli.selection_policy {
        config.app_config_mut().models.selection_policy = policy;
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let general = &config.app_config().general;
    let _log_guard = logging::init_tracing(
        &config.log_dir(),
        general.log_file.as_deref(),
        &general.log_level,
    )?;

    let mut app = app::App::new(&cli, &config)?;
    app.run()?;

    Ok(())
}
