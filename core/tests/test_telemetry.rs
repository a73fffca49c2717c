#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blockzip_core::config::Mode;
    use blockzip_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    fn counters() -> TelemetryCounters {
        let mut c = TelemetryCounters::default();
        for _ in 0..4 {
            c.add_read(1000);
            c.add_transform(1000, 250);
            c.add_write(250);
        }
        c
    }

    fn timer() -> TelemetryTimer {
        let mut timer = TelemetryTimer::new();
        std::thread::sleep(Duration::from_millis(20));
        timer.add_stage_time(Stage::Read, Duration::from_millis(2));
        timer.add_stage_time(Stage::Compress, Duration::from_millis(5));
        timer.add_stage_time(Stage::Write, Duration::from_millis(1));
        timer.finish();
        timer
    }

    #[test]
    fn merge_and_add_assign_agree() {
        let mut a = counters();
        a.merge(&counters());
        let mut b = counters();
        b += counters();
        assert_eq!(a, b);
        assert_eq!(a.blocks_read, 8);
        assert_eq!(a.bytes_transformed_out, 2000);
    }

    #[test]
    fn compress_ratio_and_throughput() {
        let snap = TelemetrySnapshot::from(Mode::Compress, 2, &counters(), &timer());
        assert!((snap.compression_ratio - 0.25).abs() < 1e-9);
        assert!(snap.throughput_bytes_per_sec > 0.0);
        assert!(snap.elapsed >= Duration::from_millis(20));
        assert!(snap.sanity_check());
        assert_eq!(snap.output_bytes(), 1000);
    }

    #[test]
    fn decompress_ratio_uses_output_as_uncompressed() {
        let mut c = TelemetryCounters::default();
        c.add_read(100);
        c.add_transform(100, 400);
        c.add_write(400);
        let snap = TelemetrySnapshot::from(Mode::Decompress, 1, &c, &timer());
        assert!((snap.compression_ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn empty_run_has_zero_ratio() {
        let snap = TelemetrySnapshot::from(Mode::Compress, 1, &TelemetryCounters::default(), &timer());
        assert_eq!(snap.compression_ratio, 0.0);
        assert!(snap.sanity_check());
    }

    #[test]
    fn stage_times_accumulate_and_merge() {
        let mut a = StageTimes::default();
        a.add(Stage::Compress, Duration::from_millis(3));
        a.add(Stage::Compress, Duration::from_millis(4));
        let mut b = StageTimes::default();
        b.add(Stage::Compress, Duration::from_millis(1));
        b.add(Stage::Write, Duration::from_millis(2));
        a.merge(&b);

        assert_eq!(a.get(Stage::Compress), Duration::from_millis(8));
        assert_eq!(a.get(Stage::Decompress), Duration::ZERO);
        assert_eq!(a.total(), Duration::from_millis(10));
        assert!(a.has_all(&[Stage::Compress, Stage::Write]));
        assert!(!a.has_all(&[Stage::Read]));
        assert_eq!(Stage::Decompress.to_string(), "decompress");
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snap = TelemetrySnapshot::from(Mode::Compress, 2, &counters(), &timer());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["mode"], "compress");
        assert_eq!(json["workers"], 2);
        assert_eq!(json["counters"]["blocks_written"], 4);
    }
}
