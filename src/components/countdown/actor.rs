use super::client::CalendarClient;
use super::clock::{Clock, VirtualClock};
use super::models::{ContainerConfig, CountdownSnapshot, CountdownStatus, EventInfo};
use super::render::{failure_message, no_events_message, render};
use super::scheduler::start_ticker;
use super::target::RenderTarget;
use crate::error::{component_error, CountdownResult};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The countdown actor driving one container
pub struct CountdownActor {
    container: ContainerConfig,
    target: RenderTarget,
    client: CalendarClient,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    interval: Duration,
    step: chrono::Duration,
    command_rx: mpsc::Receiver<CountdownCommand>,
    own_handle: CountdownActorHandle,
    status_tx: watch::Sender<CountdownStatus>,
    state: Option<CountdownState>,
    ticker: Option<JoinHandle<()>>,
}

/// Commands that can be sent to the countdown actor
pub enum CountdownCommand {
    Tick,
    Snapshot(mpsc::Sender<Option<CountdownSnapshot>>),
    Shutdown,
}

/// Event being counted down to, with its virtual clock
struct CountdownState {
    event: EventInfo,
    clock: VirtualClock,
}

impl CountdownState {
    fn new(event: EventInfo, step: chrono::Duration) -> Self {
        let clock = VirtualClock::new(event.reference_now, step);
        Self { event, clock }
    }

    fn tick(&mut self) {
        self.event.reference_now = self.clock.advance();
    }

    fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            event: self.event.clone(),
            ticks: self.clock.ticks(),
        }
    }
}

/// Handle for communicating with the countdown actor
#[derive(Clone)]
pub struct CountdownActorHandle {
    command_tx: mpsc::Sender<CountdownCommand>,
}

impl CountdownActorHandle {
    /// Ask the actor to advance its virtual clock and re-render
    pub async fn tick(&self) -> CountdownResult<()> {
        self.command_tx
            .send(CountdownCommand::Tick)
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))
    }

    /// Current event and tick count, `None` until an event is shown
    pub async fn snapshot(&self) -> CountdownResult<Option<CountdownSnapshot>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(CountdownCommand::Snapshot(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CountdownResult<()> {
        let _ = self.command_tx.send(CountdownCommand::Shutdown).await;
        Ok(())
    }
}

/// Everything an actor needs besides its container
pub struct ActorParts {
    pub client: CalendarClient,
    pub clock: Arc<dyn Clock>,
    pub timezone: Tz,
    pub interval: Duration,
    pub step: chrono::Duration,
}

impl CountdownActor {
    /// Create a new actor and return its handle
    pub fn new(
        container: ContainerConfig,
        target: RenderTarget,
        parts: ActorParts,
        status_tx: watch::Sender<CountdownStatus>,
    ) -> (Self, CountdownActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let handle = CountdownActorHandle { command_tx };

        let actor = Self {
            container,
            target,
            client: parts.client,
            clock: parts.clock,
            timezone: parts.timezone,
            interval: parts.interval,
            step: parts.step,
            command_rx,
            own_handle: handle.clone(),
            status_tx,
            state: None,
            ticker: None,
        };

        (actor, handle)
    }

    /// Fetch once, then serve ticks until shut down
    pub async fn run(&mut self) {
        info!(
            "Countdown for calendar {} started at {}",
            self.container.calendar_id,
            self.target.container()
        );

        if !self.start().await {
            self.finish().await;
            return;
        }

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                CountdownCommand::Tick => self.tick().await,
                CountdownCommand::Snapshot(response_tx) => {
                    let snapshot = self.state.as_ref().map(CountdownState::snapshot);
                    let _ = response_tx.send(snapshot).await;
                }
                CountdownCommand::Shutdown => {
                    info!("Countdown for calendar {} shutting down", self.container.calendar_id);
                    break;
                }
            }
        }

        self.finish().await;
    }

    /// Resolve the initial fetch. Returns false if shut down while waiting.
    async fn start(&mut self) -> bool {
        let Some(result) = self.fetch().await else {
            return false;
        };

        match result {
            Ok(Some(mut event)) => {
                event.reference_now = self.clock.now();
                info!(
                    "Next event for calendar {}: {} at {}",
                    self.container.calendar_id, event.title, event.start_time
                );
                self.state = Some(CountdownState::new(event, self.step));
                self.render().await;
                self.ticker = Some(start_ticker(self.interval, self.own_handle.clone()));
                self.set_status(CountdownStatus::Running).await;
            }
            Ok(None) => {
                self.target.replace_content(no_events_message()).await;
                self.set_status(CountdownStatus::NoEvents).await;
            }
            Err(e) => {
                warn!(
                    "Failed to fetch next event for calendar {}: {}",
                    self.container.calendar_id, e
                );
                self.target.replace_content(failure_message()).await;
                self.set_status(CountdownStatus::Failed).await;
            }
        }

        true
    }

    /// Wait for the calendar response while still answering the mailbox
    async fn fetch(&mut self) -> Option<CountdownResult<Option<EventInfo>>> {
        let now = self.clock.now();
        let fetch = self.client.fetch_next_event(
            &self.container.calendar_id,
            &self.container.api_key,
            now,
        );
        tokio::pin!(fetch);

        loop {
            tokio::select! {
                result = &mut fetch => return Some(result),
                cmd = self.command_rx.recv() => match cmd {
                    Some(CountdownCommand::Snapshot(response_tx)) => {
                        let _ = response_tx.send(None).await;
                    }
                    Some(CountdownCommand::Tick) => {}
                    Some(CountdownCommand::Shutdown) | None => return None,
                },
            }
        }
    }

    async fn tick(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.tick();
        debug!(
            "Countdown tick {} for calendar {}",
            state.clock.ticks(),
            self.container.calendar_id
        );
        self.render().await;
    }

    async fn render(&self) {
        if let Some(state) = &self.state {
            let rendering = render(&state.event, self.timezone);
            self.target.write(&rendering).await;
        }
    }

    async fn set_status(&self, status: CountdownStatus) {
        self.status_tx.send_replace(status);
        self.target.mark(status).await;
    }

    async fn finish(&mut self) {
        self.stop_ticker();
        self.set_status(CountdownStatus::Stopped).await;
        info!("Countdown for calendar {} shut down", self.container.calendar_id);
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for CountdownActor {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
