mod app;
mod commands;
mod console;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};

use supermem_core::{load_config, Argon2Credentials, Config, Database, Diagnostics};

#[derive(Parser)]
#[command(name = "supermem", about = "SuperMem vocabulary trainer", version)]
struct Cli {
    /// Configuration file (default: supermem.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Users file, overriding the configuration
    #[arg(long, global = true)]
    users: Option<PathBuf>,

    /// Dictionaries directory, overriding the configuration
    #[arg(long, global = true)]
    dictionaries: Option<PathBuf>,

    /// Load only this dictionary file (repeatable)
    #[arg(long = "dictionary", global = true)]
    dictionary_files: Vec<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List every language and what it can be learned from
    Languages,

    /// List loaded dictionaries with their word counts
    Dictionaries,

    /// Load all data and report skipped or repaired records
    Check,
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(users) = cli.users {
        config.users_file = users;
    }
    if let Some(dictionaries) = cli.dictionaries {
        config.dictionaries_dir = dictionaries;
    }
    init_logging(&config, cli.verbose);

    let explicit = (!cli.dictionary_files.is_empty()).then_some(cli.dictionary_files.as_slice());
    let mut diag = Diagnostics::new();
    let db = Database::open(&config, explicit, &mut diag)
        .with_context(|| format!("Failed to load data from {}", config.users_file.display()))?;

    match cli.command {
        None => {
            let mut app = app::App::new(console::Console::stdio(), db, Box::new(Argon2Credentials::new()));
            app.run_and_save()?;
        }
        Some(Command::Languages) => commands::languages::run(&db, &cli.format)?,
        Some(Command::Dictionaries) => commands::dictionaries::run(&db, &cli.format)?,
        Some(Command::Check) => commands::check::run(&db, &diag, &cli.format)?,
    }

    Ok(())
}
