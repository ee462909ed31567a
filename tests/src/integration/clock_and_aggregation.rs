//! # Clock and Aggregation Scenarios
//!
//! The epoch clock and the entry aggregator fed from the same data the
//! controller would publish: window boundaries, remaining-time decomposition,
//! and participant payloads with valid, malformed and reordered records.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use raffle_sync::{
        aggregate, compute_snapshot, rank_by_tickets, shorten_address, EntryAggregator,
        EntryRecord, EpochClock, EpochWindow, ManualTimeSource, ParticipantsPayload, RawEntry,
        RemainingTime,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn ts(day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, min, sec).unwrap()
    }

    /// The five-day draw window 2025-01-20 .. 2025-01-25.
    fn window() -> EpochWindow {
        EpochWindow::new(ts(20, 0, 0, 0), ts(25, 0, 0, 0)).unwrap()
    }

    fn entry(address: &str, hour: u32, tickets: u64) -> EntryRecord {
        EntryRecord::new(address, ts(21, hour, 0, 0), tickets as f64 * 5.0, 0.0, tickets)
    }

    // =============================================================================
    // EPOCH CLOCK
    // =============================================================================

    #[test]
    fn test_one_day_into_five_day_window() {
        let snapshot = compute_snapshot(&window(), 535, ts(21, 0, 0, 0));
        assert!((snapshot.progress_percent - 20.0).abs() < 1e-9);
        assert_eq!(
            snapshot.remaining,
            RemainingTime {
                days: 4,
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
        assert_eq!(snapshot.progress_display(), "20.00%");
    }

    #[test]
    fn test_window_start_and_end() {
        let at_start = compute_snapshot(&window(), 535, ts(20, 0, 0, 0));
        assert_eq!(at_start.progress_percent, 0.0);
        assert_eq!(at_start.remaining.days, 5);

        for now in [ts(25, 0, 0, 0), ts(25, 0, 0, 1), ts(30, 12, 0, 0)] {
            let snapshot = compute_snapshot(&window(), 535, now);
            assert_eq!(snapshot.progress_percent, 100.0);
            assert!(snapshot.remaining.is_zero());
            assert!(snapshot.is_complete());
        }
    }

    #[test]
    fn test_remaining_components_sum_to_floor() {
        let w = window();
        let instants = [
            ts(20, 0, 0, 1),
            ts(21, 13, 47, 9),
            ts(22, 23, 59, 59),
            ts(24, 23, 59, 59),
            ts(23, 6, 30, 0) + Duration::milliseconds(999),
        ];
        for now in instants {
            let snapshot = compute_snapshot(&w, 1, now);
            let expected = (w.end() - now).num_seconds() as u64;
            assert_eq!(snapshot.remaining.total_seconds(), expected, "at {now}");
            assert!(snapshot.remaining.hours < 24);
            assert!(snapshot.remaining.minutes < 60);
            assert!(snapshot.remaining.seconds < 60);
        }
    }

    #[test]
    fn test_clock_follows_manual_time_source() {
        let clock = EpochClock::new(window(), 535);
        let time = ManualTimeSource::new(ts(20, 12, 0, 0));
        assert!((clock.snapshot_now(&time).progress_percent - 10.0).abs() < 1e-9);

        time.advance(Duration::days(2));
        let snapshot = clock.snapshot_now(&time);
        assert!((snapshot.progress_percent - 50.0).abs() < 1e-9);
        assert_eq!(snapshot.remaining.to_string(), "2d 12h 0m 0s");

        time.set(ts(26, 0, 0, 0));
        assert!(clock.snapshot_now(&time).is_complete());
    }

    #[test]
    fn test_fixed_cycle_matches_explicit_window() {
        let anchor = ts(20, 0, 0, 0);
        let cycle = EpochWindow::fixed_cycle(anchor, Duration::days(5)).unwrap();
        assert_eq!(cycle, window());
        assert_eq!(
            compute_snapshot(&cycle, 535, ts(21, 0, 0, 0)),
            compute_snapshot(&window(), 535, ts(21, 0, 0, 0))
        );
    }

    // =============================================================================
    // ENTRY AGGREGATION
    // =============================================================================

    #[test]
    fn test_empty_aggregate() {
        let view = aggregate(&[]);
        assert_eq!(view.total_tickets, 0);
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_total_and_order_preserved() {
        let records = [entry("addr1first", 9, 3), entry("addr1second", 8, 5)];
        let view = aggregate(&records);
        assert_eq!(view.total_tickets, 8);
        let addresses: Vec<_> = view.rows.iter().map(|r| r.wallet_address.as_str()).collect();
        assert_eq!(addresses, ["addr1first", "addr1second"]);
    }

    #[test]
    fn test_short_address_unchanged() {
        assert_eq!(shorten_address("addr1abcde"), "addr1abcde");
        let view = aggregate(&[entry("addr1abcde", 8, 1)]);
        assert_eq!(view.rows[0].short_address, "addr1abcde");
    }

    #[test]
    fn test_long_address_shortened() {
        let address = "addr1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh";
        assert_eq!(shorten_address(address), "addr1qxy...fjhx0wlh");
    }

    #[test]
    fn test_leaderboard_is_explicit() {
        let mut records = vec![
            entry("addr1small", 8, 1),
            entry("addr1late_big", 12, 9),
            entry("addr1early_big", 10, 9),
        ];
        assert_eq!(aggregate(&records).rows[0].wallet_address, "addr1small");

        rank_by_tickets(&mut records);
        let view = aggregate(&records);
        let addresses: Vec<_> = view.rows.iter().map(|r| r.wallet_address.as_str()).collect();
        assert_eq!(addresses, ["addr1early_big", "addr1late_big", "addr1small"]);
        assert_eq!(view.total_tickets, 19);
    }

    #[test]
    fn test_malformed_entries_skipped_and_counted() {
        let valid = entry("addr1valid", 8, 4);
        let payload = ParticipantsPayload {
            participants: vec![
                RawEntry::from_record(&valid),
                RawEntry {
                    tickets: Some(-2),
                    ..RawEntry::from_record(&valid)
                },
                RawEntry {
                    entry_time: Some("yesterday".to_string()),
                    ..RawEntry::from_record(&valid)
                },
                RawEntry {
                    wallet_address: None,
                    ..RawEntry::from_record(&valid)
                },
            ],
            total_entries: Some(4),
        };

        let view = EntryAggregator::utc().aggregate_payload(&payload);
        assert_eq!(view.len(), 1);
        assert_eq!(view.total_tickets, 4);
        assert_eq!(view.skipped_entries, 3);
        assert_eq!(view.reported_total, Some(4));
    }

    #[test]
    fn test_display_offset_changes_only_formatting() {
        let records = [entry("addr1offset", 23, 2)];
        let utc = EntryAggregator::utc().aggregate(&records);
        let east = EntryAggregator::from_offset_secs(2 * 3600).aggregate(&records);

        assert_eq!(utc.rows[0].entry_time, east.rows[0].entry_time);
        assert_ne!(utc.rows[0].formatted_time, east.rows[0].formatted_time);
        assert!(east.rows[0].formatted_time.contains("01:00"));
    }
}
