use crate::components::ComponentManager;
use crate::config::Config;
use crate::error::Error;
use crate::markup::{Document, SharedDocument};
use crate::shutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Load the page, start a countdown per container and run until a signal arrives
pub async fn start_page(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (page_path, display_page, interval) = {
        let config_read = config.read().await;
        (
            config_read.page_path.clone(),
            config_read.display_page,
            config_read.tick_interval(),
        )
    };

    let document = Document::load(&page_path)?.into_shared();

    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    let count = {
        let document_read = document.read().await;
        component_manager.register_containers(&document_read)
    };
    if count == 0 {
        warn!("No countdown containers found in {}", page_path);
    } else {
        info!("Found {} countdown container(s) in {}", count, page_path);
    }

    component_manager.init_all(Arc::clone(&document)).await?;
    let component_manager = Arc::new(component_manager);

    let display_task = display_page.then(|| spawn_display(Arc::clone(&document), interval));

    // Set up signal handlers for graceful shutdown
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(shutdown::handle_signals(
        shutdown_send,
        Arc::clone(&component_manager),
    ));

    let _ = shutdown_recv.await;

    if let Some(task) = display_task {
        task.abort();
    }
    if display_page {
        println!("{}", document.read().await.to_html());
    }

    info!("Event countdown stopped");
    Ok(())
}

/// Print the page whenever its rendering changes
fn spawn_display(document: SharedDocument, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = String::new();
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let html = document.read().await.to_html();
            if html != last {
                println!("{}", html);
                last = html;
            }
        }
    })
}
