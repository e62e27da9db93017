mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::link::LinkArgs;
use crate::commands::sync::SyncArgs;

#[derive(Parser)]
#[command(name = "gitpull")]
#[command(about = "Build notebook provisioning links and follow content syncs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a provisioning link
    Link(LinkArgs),
    /// Pull content into a notebook server and follow its progress
    Sync(SyncArgs),
    /// Rewrite a legacy `interact` query into a git-pull URL
    Interact(InteractArgs),
}

#[derive(Args)]
struct InteractArgs {
    /// Notebook server base URL
    #[arg(long, default_value = "/")]
    base_url: String,
    /// Legacy query string (`repo=..&account=..&branch=..&path=..`)
    query: String,
}

fn init_tracing() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_env("GITPULL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry().with(layer).with(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let app_config = config::load_config();

    match cli.command {
        Command::Link(args) => commands::link::run(args, &app_config),
        Command::Sync(args) => commands::sync::run(args, &app_config).await,
        Command::Interact(InteractArgs { base_url, query }) => {
            let base_url = if base_url.ends_with('/') {
                base_url
            } else {
                format!("{base_url}/")
            };
            println!("{}", gitpull::legacy_interact_redirect(&base_url, &query)?);
            Ok(())
        }
    }
}
