//! Per-subscriber snapshot stream.
//!
//! Each subscriber gets its own stream that wakes on the publish interval,
//! loads the current registry snapshot, and yields it as a JSON array.
//! The publish cadence is independent of the tick cadence, so a subscriber
//! may see the same snapshot twice or miss an intermediate tick.
//!
//! The stream is pull-driven: nothing is produced until the consumer asks
//! for the next item, and a late consumer skips missed instants instead of
//! receiving a backlog. Stale snapshots are never buffered.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use futures::stream::{self, BoxStream};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::warn;

use crate::engine::SimulationEngine;
use crate::registry::Registry;

/// Endless stream of serialized roster snapshots.
pub type SnapshotStream = BoxStream<'static, String>;

impl SimulationEngine {
    /// Subscribe to roster snapshots.
    ///
    /// Starts the clock loop if it is not already running, so the
    /// simulation only generates traffic once someone is watching. The
    /// stream never ends on its own; drop it to unsubscribe.
    pub async fn subscribe(&self) -> SnapshotStream {
        self.ensure_running().await;
        snapshot_stream(
            Arc::clone(&self.core().registry),
            self.core().publish_interval,
        )
    }
}

/// Stream `registry` snapshots every `period`, first one after one period.
pub fn snapshot_stream(registry: Arc<Registry>, period: Duration) -> SnapshotStream {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    stream::unfold((registry, ticker), |(registry, mut ticker)| async move {
        loop {
            ticker.tick().await;
            match serde_json::to_string(registry.list().as_slice()) {
                Ok(json) => return Some((json, (registry, ticker))),
                Err(e) => warn!(error = %e, "Failed to serialize spectator snapshot"),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;
    use crate::config::SimulationSettings;

    fn engine() -> SimulationEngine {
        SimulationEngine::from_settings(&SimulationSettings {
            seed: Some(9),
            ..SimulationSettings::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn emits_full_roster_as_json_array() {
        let engine = engine();
        let mut feed = engine.subscribe().await;

        let first = feed.next().await.unwrap();
        let parsed: Value = serde_json::from_str(&first).unwrap();
        let players = parsed.as_array().unwrap();
        assert_eq!(players.len(), 4);
        assert_eq!(players[0]["username"], "SweeperPro");
        assert_eq!(players[0]["board"].as_array().unwrap().len(), 9);
        engine.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_starts_the_loop() {
        let engine = engine();
        assert!(!engine.is_running().await);

        let mut feed = engine.subscribe().await;
        assert!(engine.is_running().await);

        for _ in 0..4 {
            feed.next().await.unwrap();
        }
        // Four publishes at 1s spacing span two 1.5s ticks.
        assert_eq!(engine.ticks(), 2);
        engine.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_once_per_period() {
        let engine = engine();
        let registry = Arc::clone(&engine.core().registry);
        let mut feed = snapshot_stream(registry, Duration::from_secs(1));

        let begin = Instant::now();
        feed.next().await.unwrap();
        feed.next().await.unwrap();
        feed.next().await.unwrap();
        assert_eq!(begin.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_subscriber_gets_no_backlog() {
        let engine = engine();
        let registry = Arc::clone(&engine.core().registry);
        let mut feed = snapshot_stream(registry, Duration::from_secs(1));

        feed.next().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5500)).await;

        let begin = Instant::now();
        feed.next().await.unwrap();
        // One catch-up item is ready at once; the next waits for the grid.
        assert_eq!(begin.elapsed(), Duration::ZERO);
        feed.next().await.unwrap();
        assert!(begin.elapsed() >= Duration::from_millis(500));
    }
}
