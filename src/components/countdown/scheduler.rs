use super::actor::CountdownActorHandle;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Start the ticker that asks the actor to re-render every `period`.
///
/// The first tick fires one full period after start. Late ticks are not made
/// up; the schedule simply shifts.
pub fn start_ticker(period: Duration, handle: CountdownActorHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if handle.tick().await.is_err() {
                debug!("Countdown actor is gone, stopping ticker");
                break;
            }
        }
    })
}
