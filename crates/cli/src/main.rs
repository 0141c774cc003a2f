use clap::Parser;

use gateway_cli::cli::Cli;
use gateway_observability::LogFormat;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("gateway error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    gateway_observability::init_with(LogFormat::Pretty, cli.global.debug);

    gateway_cli::commands::dispatch(cli).await?;
    Ok(())
}
