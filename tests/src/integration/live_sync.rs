//! # Live Sync Scenarios
//!
//! The controller driven end to end on a paused tokio clock:
//!
//! 1. **Start**: first fetch immediate, clock ticking independently
//! 2. **Failure**: one failed endpoint discards the whole cycle, previous
//!    data stays visible, the next cycle recovers
//! 3. **Races**: an older in-flight cycle never overwrites a newer one
//! 4. **Teardown**: nothing is published after shutdown, in flight or not

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use raffle_sync::{
        CycleOutcome, EntryRecord, EpochBoundsPayload, LiveSyncApi, LiveSyncController,
        ManualTimeSource, MockRaffleSource, PrizePayload, RaffleDataSource, SyncConfig, SyncState,
        WinnerPayload,
    };
    use tokio::time::{sleep, Instant};

    type Controller = LiveSyncController<MockRaffleSource, ManualTimeSource>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    fn records() -> Vec<EntryRecord> {
        vec![
            EntryRecord::new(
                "addr1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh",
                ts(20, 9),
                15.0,
                0.0,
                3,
            ),
            EntryRecord::new("addr1abcde", ts(20, 14), 25.0, 0.0, 5),
        ]
    }

    /// Controller one day into the 2025-01-20 .. 2025-01-25 window.
    fn setup_with(
        config: SyncConfig,
    ) -> (Controller, Arc<MockRaffleSource>, Arc<ManualTimeSource>) {
        let source = Arc::new(MockRaffleSource::new(1_000.0, &records()));
        let time = Arc::new(ManualTimeSource::new(ts(21, 0)));
        let controller = LiveSyncController::new(config, source.clone(), time.clone()).unwrap();
        (controller, source, time)
    }

    fn setup() -> (Controller, Arc<MockRaffleSource>, Arc<ManualTimeSource>) {
        setup_with(SyncConfig::for_testing())
    }

    fn patient_config() -> SyncConfig {
        SyncConfig {
            fetch_timeout_ms: 60_000,
            ..SyncConfig::for_testing()
        }
    }

    // =============================================================================
    // START
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let (controller, source, _) = setup();
        let mut remote = controller.subscribe_remote();
        let started = Instant::now();

        controller.start().unwrap();
        remote.changed().await.unwrap();

        assert!(started.elapsed() < controller.config().refresh_interval());
        assert_eq!(source.participant_calls(), 1);
        let view = remote.borrow_and_update().clone();
        assert_eq!(view.state, SyncState::Polling);
        assert_eq!(view.aggregate.total_tickets, 8);
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_snapshot_matches_window() {
        let (controller, _, _) = setup();
        controller.start().unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.epoch_id, 535);
        assert!((snapshot.progress_percent - 20.0).abs() < 1e-9);
        assert_eq!(snapshot.remaining.to_string(), "4d 0h 0m 0s");
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_not_blocked_by_slow_fetch() {
        let (controller, source, time) = setup_with(patient_config());
        source.push_participants_delay(Duration::from_secs(30));
        let mut snapshots = controller.subscribe_snapshots();

        controller.start().unwrap();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(source.participant_calls(), 1);

        time.advance(chrono::Duration::days(1));
        sleep(Duration::from_millis(1_500)).await;

        assert!(snapshots.has_changed().unwrap());
        let snapshot = *snapshots.borrow_and_update();
        assert!((snapshot.progress_percent - 40.0).abs() < 1e-9);
        assert_eq!(snapshot.remaining.days, 3);
        assert_eq!(controller.remote_view().state, SyncState::Idle);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(controller.remote_view().state, SyncState::Polling);
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_fetches_follow_refresh_interval() {
        let (controller, source, _) = setup();
        controller.start().unwrap();

        sleep(Duration::from_millis(100)).await;
        assert_eq!(source.participant_calls(), 1);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(source.participant_calls(), 2);
        sleep(Duration::from_secs(10)).await;
        assert_eq!(source.participant_calls(), 4);
        assert_eq!(controller.stats().cycles_committed, 4);
        controller.shutdown();
    }

    // =============================================================================
    // FAILURE HANDLING
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_participants_failure_keeps_previous_aggregate() {
        let (controller, source, _) = setup();
        let mut remote = controller.subscribe_remote();
        controller.start().unwrap();

        remote.changed().await.unwrap();
        let before = remote.borrow_and_update().clone();
        assert!(!before.last_fetch_failed);

        source.fail_participants("HTTP 503");
        source.set_prize(PrizePayload::amount(2_500.0));
        remote.changed().await.unwrap();

        let after = remote.borrow_and_update().clone();
        assert!(after.last_fetch_failed);
        assert_eq!(after.state, SyncState::Degraded);
        assert_eq!(after.aggregate, before.aggregate);
        assert_eq!(after.prize, before.prize);
        assert_eq!(after.last_success_at, before.last_success_at);
        assert!(controller.last_fetch_failed());
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_triggers_keep_running_after_failure() {
        let (controller, source, _) = setup();
        source.fail_participants("connection refused");
        let mut remote = controller.subscribe_remote();
        controller.start().unwrap();

        remote.changed().await.unwrap();
        assert_eq!(remote.borrow_and_update().state, SyncState::Degraded);
        assert!(controller.is_running());

        source.set_records(&records());
        remote.changed().await.unwrap();
        let view = remote.borrow_and_update().clone();
        assert_eq!(view.state, SyncState::Polling);
        assert!(!view.last_fetch_failed);
        assert_eq!(view.aggregate.total_tickets, 8);

        let stats = controller.stats();
        assert_eq!(stats.cycles_failed, 1);
        assert_eq!(stats.cycles_committed, 1);
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycle_times_out_and_recovers() {
        let (controller, source, _) = setup();
        source.push_participants_delay(Duration::from_secs(10));
        let mut remote = controller.subscribe_remote();
        controller.start().unwrap();

        remote.changed().await.unwrap();
        let view = remote.borrow_and_update().clone();
        assert_eq!(view.state, SyncState::Degraded);
        assert!(view.last_error.unwrap().contains("timed out"));

        remote.changed().await.unwrap();
        assert_eq!(remote.borrow_and_update().state, SyncState::Polling);
        controller.shutdown();
    }

    #[tokio::test]
    async fn test_winner_failure_discards_cycle() {
        let config = SyncConfig {
            winner_enabled: true,
            ..SyncConfig::for_testing()
        };
        let (controller, source, _) = setup_with(config);
        source.set_winner(WinnerPayload::default());
        assert!(controller.refresh_now().await.is_committed());
        assert!(!controller.remote_view().winner.unwrap().has_winner());

        source.set_records(&records()[..1]);
        source.fail_winner("HTTP 500");
        assert!(matches!(controller.refresh_now().await, CycleOutcome::Failed { .. }));
        assert_eq!(controller.remote_view().aggregate.total_tickets, 8);
    }

    #[tokio::test]
    async fn test_backend_bounds_never_move_configured_window() {
        let config = SyncConfig {
            epoch_bounds_enabled: true,
            ..SyncConfig::for_testing()
        };
        let (controller, source, _) = setup_with(config);
        source.set_bounds(EpochBoundsPayload {
            epoch_start: "2025-01-21T00:00:00".to_string(),
            epoch_end: "2025-01-26T00:00:00".to_string(),
            time_remaining: Some(432_000.0),
        });

        assert!(controller.refresh_now().await.is_committed());
        let bounds = controller.remote_view().epoch_bounds.unwrap();
        assert_eq!(bounds.end, ts(26, 0));
        assert_eq!(controller.clock().window().end(), ts(25, 0));
        assert!((controller.snapshot().progress_percent - 20.0).abs() < 1e-9);
    }

    // =============================================================================
    // RACES
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_stale_scheduled_cycle_is_discarded() {
        let (controller, source, _) = setup();
        source.push_participants_delay(Duration::from_millis(1_500));
        controller.start().unwrap();
        sleep(Duration::from_millis(100)).await;

        source.set_records(&records()[1..]);
        assert_eq!(controller.refresh_now().await, CycleOutcome::Committed { sequence: 2 });

        sleep(Duration::from_secs(2)).await;
        let view = controller.remote_view();
        assert_eq!(view.sequence, 2);
        assert_eq!(view.aggregate.total_tickets, 5);
        assert_eq!(controller.stats().cycles_stale, 1);
        controller.shutdown();
    }

    // =============================================================================
    // TEARDOWN
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_no_updates_after_shutdown() {
        let (controller, source, time) = setup();
        let mut remote = controller.subscribe_remote();
        let mut snapshots = controller.subscribe_snapshots();
        controller.start().unwrap();
        remote.changed().await.unwrap();
        remote.borrow_and_update();
        snapshots.borrow_and_update();

        controller.shutdown();
        let calls = source.participant_calls();
        let ticks = controller.stats().clock_ticks;

        time.advance(chrono::Duration::days(1));
        sleep(Duration::from_secs(60)).await;

        assert!(!remote.has_changed().unwrap());
        assert!(!snapshots.has_changed().unwrap());
        assert_eq!(source.participant_calls(), calls);
        assert_eq!(controller.stats().clock_ticks, ticks);
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_scheduled_cycle_dropped_on_shutdown() {
        let (controller, source, _) = setup_with(patient_config());
        source.push_participants_delay(Duration::from_secs(3));
        let mut remote = controller.subscribe_remote();
        controller.start().unwrap();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(source.participant_calls(), 1);
        controller.shutdown();

        sleep(Duration::from_secs(10)).await;
        assert!(!remote.has_changed().unwrap());
        assert_eq!(controller.remote_view().state, SyncState::Idle);
        assert_eq!(controller.remote_view().sequence, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_manual_refresh_dropped_on_shutdown() {
        let (controller, source, _) = setup_with(patient_config());
        let controller = Arc::new(controller);
        source.push_participants_delay(Duration::from_secs(3));

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.refresh_now().await })
        };
        sleep(Duration::from_millis(100)).await;
        controller.shutdown();

        assert_eq!(pending.await.unwrap(), CycleOutcome::Disposed);
        assert_eq!(controller.remote_view().state, SyncState::Idle);
        assert!(controller.remote_view().prize.is_none());
    }

    // =============================================================================
    // TRAIT OBJECTS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_driven_through_trait_objects() {
        let source: Arc<dyn RaffleDataSource> = Arc::new(MockRaffleSource::new(42.0, &records()));
        let time = Arc::new(ManualTimeSource::new(ts(21, 0)));
        let controller = LiveSyncController::new(SyncConfig::for_testing(), source, time).unwrap();
        let api: Arc<dyn LiveSyncApi> = Arc::new(controller);

        let mut remote = api.subscribe_remote();
        api.start().unwrap();
        remote.changed().await.unwrap();

        assert_eq!(api.state(), SyncState::Polling);
        assert_eq!(api.remote_view().prize.and_then(|p| p.amount), Some(42.0));
        api.shutdown();
        api.shutdown();
        assert!(!api.is_running());
        assert_eq!(api.refresh_now().await, CycleOutcome::Disposed);
    }
}
