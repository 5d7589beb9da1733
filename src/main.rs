use event_countdown::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting event countdown");

    // Load configuration
    let config = startup::load_config().await?;

    // Render the page until interrupted
    startup::start_page(config).await
}
