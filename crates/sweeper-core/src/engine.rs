//! The spectator simulation engine and its clock loop.
//!
//! [`SimulationEngine`] owns the [`Registry`], the injected [`Entropy`] and
//! [`Clock`], and the handle of the background loop that ticks every
//! session on a fixed wall-clock sleep.
//!
//! # Tick atomicity
//!
//! A tick reads the current snapshot, builds a complete replacement list
//! from it, and swaps the list in with a single store. Ticks are serialized
//! by the entropy lock, so a manual [`SimulationEngine::tick`] can never
//! interleave with the loop's own tick and lose an update.
//!
//! # Lifecycle
//!
//! - [`SimulationEngine::ensure_running`] starts the loop unless it already
//!   runs (idempotent).
//! - [`SimulationEngine::shutdown`] signals cancellation and waits for the
//!   loop to exit (idempotent). Cancellation is only observed between
//!   ticks, so a stop never leaves a tick half-applied.
//! - A stopped engine can be started again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sweeper_types::{ActivePlayer, SessionId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::SimulationSettings;
use crate::entropy::{Entropy, SeededEntropy};
use crate::registry::{Registry, Snapshot};
use crate::session::{self, SessionParams, Transition};

/// Tally of what one tick did across the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sequence number of this tick (first tick is 1).
    pub tick: u64,
    /// Sessions that stayed in play.
    pub continued: usize,
    /// Sessions that were lost this tick.
    pub lost: usize,
    /// Sessions that were won this tick.
    pub won: usize,
    /// Finished sessions that restarted.
    pub restarted: usize,
    /// Finished sessions that stayed finished.
    pub idle: usize,
}

impl TickReport {
    fn record(&mut self, transition: Transition) {
        let slot = match transition {
            Transition::Continued => &mut self.continued,
            Transition::Lost => &mut self.lost,
            Transition::Won => &mut self.won,
            Transition::Restarted => &mut self.restarted,
            Transition::Idle => &mut self.idle,
        };
        *slot = slot.saturating_add(1);
    }
}

/// State shared between the engine handle and its background loop.
pub(crate) struct EngineCore {
    pub(crate) registry: Arc<Registry>,
    entropy: Mutex<Box<dyn Entropy>>,
    clock: Arc<dyn Clock>,
    params: SessionParams,
    tick_interval: Duration,
    pub(crate) publish_interval: Duration,
    ticks: AtomicU64,
}

impl EngineCore {
    async fn tick(&self) -> TickReport {
        let mut entropy = self.entropy.lock().await;
        let now = self.clock.now();
        let current = self.registry.list();

        let mut report = TickReport::default();
        let mut next = Vec::with_capacity(current.len());
        for player in current.iter() {
            let mut player = player.clone();
            let transition = session::advance(&mut player, self.params, &mut **entropy, now);
            match transition {
                Transition::Lost | Transition::Won | Transition::Restarted => info!(
                    player = %player.username,
                    status = %player.status,
                    timer = player.timer,
                    ?transition,
                    "Session changed state"
                ),
                Transition::Continued | Transition::Idle => {}
            }
            report.record(transition);
            next.push(player);
        }

        self.registry.replace(next);
        report.tick = self.ticks.fetch_add(1, Ordering::SeqCst).saturating_add(1);

        debug!(
            tick = report.tick,
            continued = report.continued,
            lost = report.lost,
            won = report.won,
            restarted = report.restarted,
            "Tick applied"
        );
        report
    }
}

/// Background loop bookkeeping.
struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of the spectator sessions and the loop that advances them.
///
/// Construct one per process at the composition root and share it by
/// reference (typically inside an `Arc`) with request handlers.
pub struct SimulationEngine {
    core: Arc<EngineCore>,
    runner: Mutex<Option<RunningLoop>>,
}

impl SimulationEngine {
    /// Build an engine with an explicit randomness source and clock.
    ///
    /// The roster is created immediately: one playing session per name in
    /// `settings.roster`, each looking like a game already in progress.
    pub fn new(
        settings: &SimulationSettings,
        mut entropy: Box<dyn Entropy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let params = SessionParams {
            rows: settings.rows,
            cols: settings.cols,
            mines: settings.mines,
        };
        let now = clock.now();
        let roster: Vec<ActivePlayer> = settings
            .roster
            .iter()
            .map(|name| session::spawn(name, params, entropy.as_mut(), now))
            .collect();

        info!(
            sessions = roster.len(),
            rows = params.rows,
            cols = params.cols,
            tick_interval_ms = settings.tick_interval_ms,
            "Spectator roster created"
        );

        Self {
            core: Arc::new(EngineCore {
                registry: Arc::new(Registry::new(roster)),
                entropy: Mutex::new(entropy),
                clock,
                params,
                tick_interval: settings.tick_interval(),
                publish_interval: settings.publish_interval(),
                ticks: AtomicU64::new(0),
            }),
            runner: Mutex::new(None),
        }
    }

    /// Build an engine from settings alone: [`SeededEntropy`] (seeded when
    /// `settings.seed` is set) and the [`SystemClock`].
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self::new(
            settings,
            Box::new(SeededEntropy::new(settings.seed)),
            Arc::new(SystemClock),
        )
    }

    pub(crate) const fn core(&self) -> &Arc<EngineCore> {
        &self.core
    }

    /// The session registry.
    pub fn registry(&self) -> &Registry {
        &self.core.registry
    }

    /// Snapshot of every session, in roster order.
    pub fn list_active_sessions(&self) -> Snapshot {
        self.core.registry.list()
    }

    /// Snapshot of one session, or `None` if `id` was never issued.
    pub fn get_session(&self, id: SessionId) -> Option<ActivePlayer> {
        self.core.registry.find(id)
    }

    /// Run exactly one tick now, independent of the loop.
    pub async fn tick(&self) -> TickReport {
        self.core.tick().await
    }

    /// Number of ticks applied since construction.
    pub fn ticks(&self) -> u64 {
        self.core.ticks.load(Ordering::SeqCst)
    }

    /// Whether the clock loop is currently running.
    pub async fn is_running(&self) -> bool {
        self.runner
            .lock()
            .await
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Start the clock loop unless it is already running.
    ///
    /// Returns `true` when this call started it.
    pub async fn ensure_running(&self) -> bool {
        let mut runner = self.runner.lock().await;
        if runner
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(Arc::clone(&self.core), cancel.clone()));
        *runner = Some(RunningLoop { cancel, handle });
        true
    }

    /// Stop the clock loop and wait for it to exit.
    ///
    /// Returns `true` when a running loop was stopped, `false` when there
    /// was nothing to stop.
    pub async fn shutdown(&self) -> bool {
        let mut runner = self.runner.lock().await;
        let Some(running) = runner.take() else {
            return false;
        };

        running.cancel.cancel();
        if let Err(e) = running.handle.await {
            warn!(error = %e, "Simulation loop ended abnormally");
        }
        true
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        if let Some(running) = self.runner.get_mut().take() {
            running.cancel.cancel();
        }
    }
}

impl core::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("sessions", &self.core.registry.len())
            .field("ticks", &self.ticks())
            .field("tick_interval", &self.core.tick_interval)
            .finish_non_exhaustive()
    }
}

/// Sleep, tick, repeat until cancelled.
async fn run_loop(core: Arc<EngineCore>, cancel: CancellationToken) {
    info!(
        tick_interval_ms = core.tick_interval.as_millis(),
        "Simulation loop started"
    );

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(core.tick_interval) => {}
        }
        core.tick().await;
    }

    info!(ticks = core.ticks.load(Ordering::SeqCst), "Simulation loop stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::{DateTime, Duration as ChronoDuration};
    use sweeper_types::GameStatus;

    use super::*;
    use crate::clock::ManualClock;
    use crate::entropy::FixedEntropy;

    fn settings() -> SimulationSettings {
        SimulationSettings {
            seed: Some(42),
            ..SimulationSettings::default()
        }
    }

    fn engine_with(entropy: Box<dyn Entropy>, clock: Arc<dyn Clock>) -> SimulationEngine {
        SimulationEngine::new(&settings(), entropy, clock)
    }

    fn start() -> DateTime<chrono::Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn roster_has_four_named_playing_sessions() {
        let engine = SimulationEngine::from_settings(&settings());
        let sessions = engine.list_active_sessions();
        let names: Vec<_> = sessions.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["SweeperPro", "MineHunter", "FlagQueen", "BombSquad"]);
        assert!(sessions.iter().all(|p| p.status == GameStatus::Playing));
        assert!(sessions.iter().all(|p| p.mines_count == 10));
    }

    #[tokio::test]
    async fn forced_stay_ticks_every_timer_once() {
        let engine = engine_with(
            Box::new(FixedEntropy::new(0.0)),
            Arc::new(ManualClock::new(start())),
        );
        let before = engine.list_active_sessions();

        let report = engine.tick().await;

        let after = engine.list_active_sessions();
        assert_eq!(report.tick, 1);
        assert_eq!(report.continued, 4);
        for (old, new) in before.iter().zip(after.iter()) {
            assert_eq!(new.timer, old.timer + 1);
            assert_eq!(new.status, old.status);
            assert_eq!(new.board, old.board);
            assert_eq!(new.id, old.id);
        }
    }

    #[tokio::test]
    async fn forced_loss_then_forced_restart() {
        let clock = Arc::new(ManualClock::new(start()));
        let engine = engine_with(Box::new(FixedEntropy::new(0.99)), clock.clone());
        let before = engine.list_active_sessions();

        let report = engine.tick().await;
        assert_eq!(report.lost, 4);
        let lost = engine.list_active_sessions();
        for (old, new) in before.iter().zip(lost.iter()) {
            assert_eq!(new.status, GameStatus::Lost);
            assert_eq!(new.timer, old.timer);
            assert_eq!(new.board, old.board);
        }

        // Same 0.99 roll on a finished game clears the restart threshold.
        clock.advance(ChronoDuration::seconds(30));
        let report = engine.tick().await;
        assert_eq!(report.restarted, 4);
        for p in engine.list_active_sessions().iter() {
            assert_eq!(p.status, GameStatus::Playing);
            assert_eq!(p.timer, 0);
            assert_eq!(p.flags_count, 0);
            assert_eq!(p.started_at, start() + ChronoDuration::seconds(30));
        }
    }

    #[tokio::test]
    async fn roster_size_never_changes() {
        let engine = SimulationEngine::from_settings(&settings());
        for _ in 0..300 {
            engine.tick().await;
            assert_eq!(engine.registry().len(), 4);
        }
        assert_eq!(engine.ticks(), 300);
    }

    #[tokio::test]
    async fn finished_sessions_keep_timer_until_restart() {
        let engine = SimulationEngine::from_settings(&settings());
        let mut previous = engine.list_active_sessions();
        for _ in 0..500 {
            engine.tick().await;
            let current = engine.list_active_sessions();
            for (old, new) in previous.iter().zip(current.iter()) {
                match (old.status, new.status) {
                    (GameStatus::Playing, GameStatus::Playing) => {
                        assert_eq!(new.timer, old.timer + 1);
                    }
                    (GameStatus::Won | GameStatus::Lost, GameStatus::Playing) => {
                        assert_eq!(new.timer, 0);
                        assert_eq!(new.flags_count, 0);
                    }
                    (_, _) => assert_eq!(new.timer, old.timer),
                }
            }
            previous = current;
        }
    }

    #[tokio::test]
    async fn unknown_session_is_absent() {
        let engine = SimulationEngine::from_settings(&settings());
        assert!(engine.get_session(SessionId::new()).is_none());
        let known = engine.list_active_sessions()[2].id;
        assert_eq!(engine.get_session(known).unwrap().username, "FlagQueen");
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ticks_on_interval() {
        let engine = SimulationEngine::from_settings(&settings());
        assert!(engine.ensure_running().await);

        tokio::time::sleep(Duration::from_millis(4600)).await;

        assert_eq!(engine.ticks(), 3);
        assert!(engine.shutdown().await);
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_running_twice_starts_one_loop() {
        let engine = SimulationEngine::from_settings(&settings());
        assert!(engine.ensure_running().await);
        assert!(!engine.ensure_running().await);
        assert!(engine.is_running().await);

        tokio::time::sleep(Duration::from_millis(4600)).await;

        assert_eq!(engine.ticks(), 3);
        engine.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_idempotent_and_restartable() {
        let engine = SimulationEngine::from_settings(&settings());
        assert!(!engine.shutdown().await);

        engine.ensure_running().await;
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(engine.shutdown().await);
        assert!(!engine.shutdown().await);
        assert!(!engine.is_running().await);

        let stopped_at = engine.ticks();
        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(engine.ticks(), stopped_at);

        assert!(engine.ensure_running().await);
        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(engine.ticks(), stopped_at + 2);
        engine.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_see_whole_ticks() {
        let engine = Arc::new(engine_with(
            Box::new(FixedEntropy::new(0.0)),
            Arc::new(ManualClock::new(start())),
        ));
        let base: Vec<u32> = engine.list_active_sessions().iter().map(|p| p.timer).collect();

        let writer = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                for _ in 0..200 {
                    engine.tick().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            let base = base.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    let snapshot = engine.list_active_sessions();
                    // Every session advances by one per tick, so a consistent
                    // snapshot shows the same delta on every session.
                    let delta = snapshot[0].timer - base[0];
                    for (p, b) in snapshot.iter().zip(base.iter()) {
                        assert_eq!(p.timer - b, delta);
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
        assert_eq!(engine.ticks(), 200);
    }
}
