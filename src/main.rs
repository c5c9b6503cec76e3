use tracing::{Level, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment may carry everything.
    let dotenv = dotenvy::dotenv();

    ai_llm_service::telemetry::init("info", Level::DEBUG)?;

    if let Err(e) = dotenv {
        warn!(error = %e, ".env not loaded");
    }

    api::start().await?;

    Ok(())
}
