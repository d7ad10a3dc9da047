//! Serve command handler.

use anyhow::Result;

use crate::commands::ServeArgs;

/// Start the HTTP job server and block until Ctrl+C.
pub async fn execute(args: &ServeArgs) -> Result<()> {
    let config = args.server_config()?;
    println!("Starting narrato on port {}", config.port);
    println!("Artifacts: {}", config.output_dir.display());
    narrato_axum::start_server(config).await
}
