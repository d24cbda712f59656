//! Application composition and the show loop.
//!
//! `App` owns the draw engine and the store. `run` multiplexes frame ticks,
//! feed frames, operator commands and shutdown on one task, so the engine is
//! only ever touched from a single place. After every step the engine's
//! outbox is flushed to the store.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use luckydraw_shared::OperatorCommand;

use crate::entities::Millis;
use crate::infrastructure::ports::{ClockPort, LotteryStore, RandomPort, StoreError};
use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::{DrawEngine, DrawObserver, LifecycleEvent, StoreRequest};

/// Main application state.
pub struct App {
    engine: DrawEngine,
    store: Arc<dyn LotteryStore>,
}

impl App {
    /// Load the roster and prizes and boot the engine.
    pub async fn load(
        settings: EngineSettings,
        store: Arc<dyn LotteryStore>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Result<Self, StoreError> {
        let snapshot = store.load_snapshot().await?;
        tracing::info!(
            participants = snapshot.participants.len(),
            prizes = snapshot.prizes.len(),
            "Loaded lottery snapshot"
        );
        let engine = DrawEngine::new(settings, snapshot, clock, random);
        Ok(Self { engine, store })
    }

    pub fn engine(&self) -> &DrawEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DrawEngine {
        &mut self.engine
    }

    /// Write everything the engine has queued for the store.
    ///
    /// Failures are logged per request and never stop the show.
    pub async fn flush(&mut self) {
        for request in self.engine.take_outbox() {
            let result = match &request {
                StoreRequest::AddParticipant(participant) => {
                    self.store.add_participant(participant).await
                }
                StoreRequest::RecordWinners(records) => self.store.record_winners(records).await,
                StoreRequest::SavePrize(prize) => self.store.save_prize(prize).await,
            };
            if let Err(e) = result {
                tracing::error!(error = %e, request = ?request, "Failed to persist draw state");
            }
        }
    }

    /// Drive the show until `shutdown` resolves, then tear the engine down.
    pub async fn run(
        &mut self,
        mut feed: mpsc::Receiver<String>,
        mut commands: mpsc::Receiver<OperatorCommand>,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()> {
        let started = Instant::now();
        let mut frames = tokio::time::interval(self.engine.settings().frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                _ = frames.tick() => {
                    self.engine.tick(started.elapsed().as_millis() as Millis);
                }
                Some(text) = feed.recv() => {
                    // Rejections are logged by the engine
                    let _ = self.engine.receive_feed(&text);
                }
                Some(command) = commands.recv() => {
                    match self.engine.handle(command) {
                        Ok(outcome) => tracing::debug!(%command, ?outcome, "Command handled"),
                        Err(e) => tracing::info!(%command, error = %e, "Command failed"),
                    }
                }
            }
            self.flush().await;
        }

        self.engine.teardown();
        self.flush().await;
        Ok(())
    }
}

/// Logs every lifecycle event in its wire form.
pub struct LoggingObserver;

impl DrawObserver for LoggingObserver {
    fn on_event(&mut self, event: &LifecycleEvent) {
        match event.to_wire() {
            Some(message) => match serde_json::to_string(&message) {
                Ok(json) => tracing::info!(event = %json, "Lifecycle event"),
                Err(e) => tracing::warn!(error = %e, "Failed to encode lifecycle event"),
            },
            None => tracing::debug!(?event, "Lifecycle event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use tokio::sync::oneshot;

    use super::*;
    use crate::infrastructure::clock::SeededRandom;
    use crate::infrastructure::ports::{LotterySnapshot, MockClockPort, MockLotteryStore};
    use crate::infrastructure::settings::TimingSettings;
    use crate::use_cases::draw::testing::{participants, prize};

    fn fast_settings() -> EngineSettings {
        EngineSettings {
            frame_interval: Duration::from_millis(5),
            timing: TimingSettings {
                boot_ms: 0,
                ..TimingSettings::default()
            },
            ..EngineSettings::default()
        }
    }

    fn clock() -> Arc<dyn ClockPort> {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .return_const(Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap());
        Arc::new(clock)
    }

    fn store_with(snapshot: LotterySnapshot) -> MockLotteryStore {
        let mut store = MockLotteryStore::new();
        store
            .expect_load_snapshot()
            .times(1)
            .returning(move || Ok(snapshot.clone()));
        store
    }

    #[tokio::test]
    async fn load_boots_engine_from_snapshot() {
        let store = store_with(LotterySnapshot {
            participants: participants(4),
            prizes: vec![prize("Phone", 1)],
        });
        let app = App::load(
            fast_settings(),
            Arc::new(store),
            clock(),
            Arc::new(SeededRandom::new(1)),
        )
        .await
        .unwrap();
        assert_eq!(app.engine().roster().len(), 4);
        assert_eq!(app.engine().cards().len(), 4);
    }

    #[tokio::test]
    async fn load_failure_is_returned() {
        let mut store = MockLotteryStore::new();
        store
            .expect_load_snapshot()
            .returning(|| Err(StoreError::io("read", "disk on fire")));
        let result = App::load(
            fast_settings(),
            Arc::new(store),
            clock(),
            Arc::new(SeededRandom::new(1)),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn store_failures_do_not_stop_the_show() {
        let mut store = store_with(LotterySnapshot::default());
        store
            .expect_add_participant()
            .times(1)
            .returning(|_| Err(StoreError::io("write", "read-only")));
        let mut app = App::load(
            fast_settings(),
            Arc::new(store),
            clock(),
            Arc::new(SeededRandom::new(1)),
        )
        .await
        .unwrap();
        app.engine_mut().tick(0);
        app.engine_mut()
            .merge_participant("Ada", "13900000001")
            .unwrap();

        app.flush().await;
        assert_eq!(app.engine().roster().len(), 1);
    }

    #[tokio::test]
    async fn run_merges_feed_and_tears_down_on_shutdown() {
        let mut store = store_with(LotterySnapshot {
            participants: participants(3),
            prizes: vec![prize("Phone", 1)],
        });
        store
            .expect_add_participant()
            .withf(|p| p.name().as_str() == "Grace")
            .times(1)
            .returning(|_| Ok(()));
        let mut app = App::load(
            fast_settings(),
            Arc::new(store),
            clock(),
            Arc::new(SeededRandom::new(1)),
        )
        .await
        .unwrap();

        let (feed_tx, feed_rx) = mpsc::channel(4);
        let (command_tx, command_rx) = mpsc::channel(4);
        feed_tx
            .send(r#"{"type":"new_person","name":"Grace","phone":"13900000002"}"#.into())
            .await
            .unwrap();
        feed_tx.send("garbage".into()).await.unwrap();
        command_tx.send(OperatorCommand::Stop).await.unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = stop_tx.send(());
        });
        app.run(feed_rx, command_rx, async {
            let _ = stop_rx.await;
        })
        .await
        .unwrap();

        assert!(app.engine().is_torn_down());
        assert_eq!(app.engine().roster().len(), 4);
        assert_eq!(
            app.engine().status(),
            luckydraw_domain::DrawStatus::Init
        );
    }
}
