mod actor;
pub mod client;
pub mod clock;
mod handle;
pub mod models;
pub mod render;
mod scheduler;
mod target;
pub mod time;

pub use handle::{CountdownHandle, CountdownSettings};
pub use models::{CountdownSnapshot, CountdownStatus, EventInfo};

use crate::config::Config;
use crate::error::CountdownResult;
use crate::markup::{ElementPath, SharedDocument};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Countdown component bound to one container of the page
pub struct Countdown {
    name: String,
    container: ElementPath,
    handle: RwLock<Option<CountdownHandle>>,
}

impl Countdown {
    /// Create a new countdown component for the container at `container`
    pub fn new(container: ElementPath) -> Self {
        Self {
            name: format!("countdown{}", container),
            container,
            handle: RwLock::new(None),
        }
    }

    pub fn container(&self) -> &ElementPath {
        &self.container
    }

    /// Status of the running countdown, `None` before init
    pub async fn status(&self) -> Option<CountdownStatus> {
        let handle_lock = self.handle.read().await;
        handle_lock.as_ref().map(CountdownHandle::status)
    }
}

#[async_trait]
impl super::Component for Countdown {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&self, document: SharedDocument, config: Arc<RwLock<Config>>) -> CountdownResult<()> {
        let settings = {
            let config_read = config.read().await;
            CountdownSettings::from_config(&config_read)?
        };

        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            let handle =
                CountdownHandle::initialize(document, self.container.clone(), &settings).await?;
            info!("Initialized {} ({})", self.name, handle.status().as_str());
            *handle_lock = Some(handle);
        }

        Ok(())
    }

    async fn shutdown(&self) -> CountdownResult<()> {
        let handle = self.handle.write().await.take();
        if let Some(handle) = handle {
            handle.stop().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
