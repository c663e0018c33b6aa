mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record { input, title, tags } => {
            commands::record::run(&input, title.as_deref(), tags.as_deref())
        }
        Commands::List => commands::list::run(),
        Commands::Show { id } => commands::show::run(&id),
        Commands::Search { query } => commands::search::run(&query),
        Commands::Delete { id } => commands::delete::run(&id),
        Commands::Status => commands::status::run(),
        Commands::Version => commands::version::run(),
    }
}
