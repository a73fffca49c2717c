#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use blockzip_core::compression::CompressionError;
    use blockzip_core::stream::lifecycle::RunOutcome;
    use blockzip_core::stream::Lifecycle;
    use blockzip_core::types::{Fault, FaultKind, PipelineError};

    fn transform_fault(index: u32) -> Fault {
        Fault::Transform {
            index,
            source: CompressionError::CodecProcessFailed { codec: "test".into(), msg: "boom".into() },
        }
    }

    #[test]
    fn fresh_lifecycle_succeeds() {
        let lc = Lifecycle::new();
        assert!(!lc.is_cancelled());
        assert!(lc.faults().is_empty());
        assert!(matches!(lc.classify(), RunOutcome::Succeeded));
    }

    #[test]
    fn on_error_records_and_cancels() {
        let lc = Lifecycle::new();
        lc.on_error(transform_fault(3));
        assert!(lc.is_cancelled());
        assert_eq!(lc.fault_count(), 1);
        assert_eq!(lc.faults()[0].kind(), FaultKind::Transform);
    }

    #[test]
    fn faults_returns_a_snapshot() {
        let lc = Lifecycle::new();
        lc.on_error(transform_fault(0));
        let snapshot = lc.faults();
        lc.on_error(transform_fault(1));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(lc.faults().len(), 2);
    }

    #[test]
    fn external_cancel_classifies_as_cancelled() {
        let lc = Lifecycle::new();
        lc.cancel();
        lc.cancel();
        assert!(lc.is_cancelled());
        assert!(matches!(lc.classify(), RunOutcome::Cancelled));
    }

    #[test]
    fn faults_take_precedence_over_cancellation() {
        let lc = Lifecycle::new();
        lc.cancel();
        lc.on_error(transform_fault(9));
        match lc.classify() {
            RunOutcome::Faulted(faults) => assert_eq!(faults.len(), 1),
            other => panic!("expected Faulted, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_faults_are_all_kept() {
        let lc = Arc::new(Lifecycle::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let lc = lc.clone();
                thread::spawn(move || lc.on_error(transform_fault(i)))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut indices: Vec<u32> = lc
            .faults()
            .iter()
            .map(|f| match f {
                Fault::Transform { index, .. } => *index,
                other => panic!("unexpected fault {other}"),
            })
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn pipeline_error_message_lists_every_fault() {
        let err = PipelineError::Faulted(vec![transform_fault(1), Fault::Configuration("bad".into())]);
        let msg = err.to_string();
        assert!(msg.starts_with("failed with 2 errors"), "{msg}");
        assert!(msg.contains("1. transform failed on block 1"), "{msg}");
        assert!(msg.contains("2. invalid configuration: bad"), "{msg}");
        assert_eq!(err.faults().len(), 2);

        assert_eq!(PipelineError::Cancelled.to_string(), "cancelled by user");
        assert!(PipelineError::Cancelled.is_cancelled());
    }
}
