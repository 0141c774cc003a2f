use anyhow::Context;

use gateway_api::config::Config;
use gateway_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    if config.log_json {
        gateway_observability::init();
    } else {
        gateway_observability::init_with(LogFormat::Pretty, false);
    }

    config.validate()?;
    config.print();

    let app = gateway_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
