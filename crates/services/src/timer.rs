use std::time::Duration;

use exam_core::ElapsedTimer;
use tokio::sync::watch;
use tokio::time::{Instant, interval_at};

use crate::tasks::SessionTasks;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Spawns the elapsed-time counter and returns a receiver of whole seconds.
pub fn spawn_timer(tick: Duration, tasks: &mut SessionTasks) -> watch::Receiver<u64> {
    let (tx, rx) = watch::channel(0);
    let mut shutdown = tasks.signal();
    tasks.spawn("timer", async move {
        let mut timer = ElapsedTimer::new();
        let mut ticks = interval_at(Instant::now() + tick, tick);
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticks.tick() => {
                    tx.send_replace(timer.tick());
                }
            }
        }
    });
    rx
}
