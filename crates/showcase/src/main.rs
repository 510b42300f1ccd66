mod app;
mod cli;
mod color;
mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use app::App;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands, OutputFormat};
use config::Config;
use output::output_error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    color::init(cli.color);

    if let Err(e) = run(&cli) {
        output_error(&e, cli.format);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
    // Commands that don't need a session store or remote host
    match &cli.command {
        Commands::Completions { shell } => {
            Cli::generate_completions(*shell);
            return Ok(());
        }
        Commands::Config {
            action: ConfigCommands::Path,
        } => return handle_config_path(cli),
        _ => {}
    }

    let config = Config::load(cli.config.as_deref())?;

    if let Commands::Config {
        action: ConfigCommands::Show,
    } = &cli.command
    {
        return handle_config_show(&config, cli.format);
    }

    let mut app = App::new(config, cli.format)?;

    match &cli.command {
        Commands::Auth { action } => commands::auth::handle_auth(&app, action),
        Commands::Project { action } => commands::project::handle_project(&app, action),
        Commands::Tool { action } => commands::tool::handle_tool(&app, action),
        Commands::Settings { action } => commands::settings::handle_settings(&mut app, action),
        Commands::Config { .. } | Commands::Completions { .. } => {
            unreachable!("handled before the app is built")
        }
    }
}

fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Text => {
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}

fn handle_config_path(cli: &Cli) -> Result<()> {
    let paths = config::config_paths(cli.config.as_deref());
    let data_dir = config::data_dir()?;

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "config_files": paths
                    .iter()
                    .map(|p| serde_json::json!({ "path": p, "exists": p.exists() }))
                    .collect::<Vec<_>>(),
                "data_dir": data_dir,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Config files (later entries override earlier ones):");
            for path in &paths {
                let marker = if path.exists() { " (found)" } else { "" };
                println!("  {}{}", path.display(), marker);
            }
            println!("Data directory: {}", data_dir.display());
        }
    }
    Ok(())
}
