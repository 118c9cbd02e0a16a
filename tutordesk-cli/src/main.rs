use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tutordesk_cli::commands::{self, Command};
use tutordesk_cli::config::ConfigSource;
use tutordesk_cli::prompt::PromptConfirmer;
use tutordesk_cli::{App, AppConfig, watch};

#[derive(Parser)]
#[command(name = "tutordesk")]
#[command(about = "Admin console for tutoring inquiries, bookings and tutor matches")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tutordesk.toml", env = "TUTORDESK_CONFIG")]
    config: PathBuf,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Stay connected: refresh on push signals and run retention cleanup
    Watch,
    #[command(flatten)]
    Session(Command),
}

fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = AppConfig::load(&cli.config)?;
    init_logging(&config.log_filter);
    match source {
        ConfigSource::File(path) => info!("loaded config from {}", path.display()),
        ConfigSource::Defaults(path) => {
            info!("config file {} not found, using defaults", path.display())
        }
    }

    let app = App::open(config).await?;

    match cli.command {
        Action::Watch => watch::run(&app).await,
        Action::Session(command) => {
            let confirmer = PromptConfirmer::new(cli.yes);
            let output = commands::execute(&app, command, &confirmer).await?;
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
            Ok(())
        }
    }
}
