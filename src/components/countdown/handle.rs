use super::actor::{ActorParts, CountdownActor, CountdownActorHandle};
use super::client::CalendarClient;
use super::clock::{Clock, SystemClock};
use super::models::{ContainerConfig, CountdownSnapshot, CountdownStatus};
use super::render::{missing_attribute_notice, FieldBindings};
use super::target::RenderTarget;
use crate::config::Config;
use crate::error::{config_error, markup_error, CountdownResult, Error};
use crate::markup::{ElementPath, SharedDocument};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// Shared settings every container's countdown is started with
#[derive(Clone)]
pub struct CountdownSettings {
    client: CalendarClient,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    interval: Duration,
    step: chrono::Duration,
}

impl CountdownSettings {
    pub fn new(client: CalendarClient, timezone: Tz, interval: Duration) -> CountdownResult<Self> {
        if interval.is_zero() {
            return Err(config_error("Tick interval must be greater than zero"));
        }
        let step = chrono::Duration::from_std(interval)
            .map_err(|_| config_error("Tick interval is too large"))?;

        Ok(Self {
            client,
            clock: Arc::new(SystemClock),
            timezone,
            interval,
            step,
        })
    }

    pub fn from_config(config: &Config) -> CountdownResult<Self> {
        config.validate()?;
        Self::new(
            CalendarClient::from_config(config)?,
            config.tz()?,
            config.tick_interval(),
        )
    }

    /// Replace the clock used for `timeMin` and the initial reference time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn actor_parts(&self) -> ActorParts {
        ActorParts {
            client: self.client.clone(),
            clock: Arc::clone(&self.clock),
            timezone: self.timezone,
            interval: self.interval,
            step: self.step,
        }
    }
}

/// Owner of one container's countdown. Dropping it stops the countdown.
pub struct CountdownHandle {
    container: ElementPath,
    actor_handle: Option<CountdownActorHandle>,
    actor_task: Option<JoinHandle<()>>,
    status_rx: watch::Receiver<CountdownStatus>,
}

impl CountdownHandle {
    /// Validate the container, then start fetching and rendering its event.
    ///
    /// A container missing `calendar-id` or `api-key` gets one notice per
    /// missing attribute and a handle in the `Invalid` state; no request is
    /// made for it.
    pub async fn initialize(
        document: SharedDocument,
        container: ElementPath,
        settings: &CountdownSettings,
    ) -> CountdownResult<Self> {
        let (config, bindings) = {
            let document = document.read().await;
            let element = document.get(&container).ok_or_else(|| {
                markup_error(&format!("No element at container path {}", container))
            })?;
            (
                ContainerConfig::from_element(element),
                FieldBindings::discover(&document, &container),
            )
        };

        let target = RenderTarget::new(document, container.clone(), bindings);

        let config = match config {
            Ok(config) => config,
            Err(Error::MissingAttributes(missing)) => {
                warn!(
                    "Countdown container {} is missing {}",
                    container,
                    missing.join(", ")
                );
                for attribute in missing {
                    target.append(missing_attribute_notice(attribute)).await;
                }
                target.mark(CountdownStatus::Invalid).await;

                let (_, status_rx) = watch::channel(CountdownStatus::Invalid);
                return Ok(Self {
                    container,
                    actor_handle: None,
                    actor_task: None,
                    status_rx,
                });
            }
            Err(e) => return Err(e),
        };

        target.mark(CountdownStatus::Pending).await;
        let (status_tx, status_rx) = watch::channel(CountdownStatus::Pending);
        let (mut actor, actor_handle) =
            CountdownActor::new(config, target, settings.actor_parts(), status_tx);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            container,
            actor_handle: Some(actor_handle),
            actor_task: Some(actor_task),
            status_rx,
        })
    }

    pub fn container(&self) -> &ElementPath {
        &self.container
    }

    pub fn status(&self) -> CountdownStatus {
        *self.status_rx.borrow()
    }

    /// Wait until the initial fetch has been resolved
    pub async fn wait_until_settled(&self) -> CountdownStatus {
        let mut status_rx = self.status_rx.clone();
        let settled = match status_rx.wait_for(CountdownStatus::is_settled).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        };
        settled
    }

    /// Current event and tick count, `None` before an event is shown
    pub async fn snapshot(&self) -> CountdownResult<Option<CountdownSnapshot>> {
        match &self.actor_handle {
            Some(handle) => handle.snapshot().await,
            None => Ok(None),
        }
    }

    /// Stop the ticker and the actor and wait for them to finish
    pub async fn stop(mut self) -> CountdownResult<()> {
        if let Some(handle) = self.actor_handle.take() {
            handle.shutdown().await?;
        }
        if let Some(task) = self.actor_task.take() {
            let _ = task.await;
        }
        Ok(())
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if let Some(task) = self.actor_task.take() {
            task.abort();
        }
    }
}
