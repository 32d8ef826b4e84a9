mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting cistab - CI Build Stability Tool");
    cli.execute().await?;

    Ok(())
}
