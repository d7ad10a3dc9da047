//! CLI entry point.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use narrato_cli::{Cli, CliError, Commands, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG and NARRATO_* from it apply
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Err(err) = run(command).await {
        eprintln!("Error: {err:#}");
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
    Ok(())
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => handlers::serve::execute(&args).await,
        Commands::Split(args) => handlers::split::execute(&args).await,
        Commands::Synth(args) => handlers::synth::execute(&args).await,
        Commands::Voices(args) => handlers::voices::execute(&args).await,
    }
}
