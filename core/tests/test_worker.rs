#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use blockzip_core::stream::lifecycle::Lifecycle;
    use blockzip_core::stream::worker::{Inlet, Outlet};
    use blockzip_core::stream::{
        Block, BlockTransform, BoundedQueue, SourceReader, TargetWriter, Worker, WorkerOutcome,
        WorkerState,
    };
    use blockzip_core::telemetry::Stage;
    use blockzip_core::types::Fault;

    struct Counting {
        left: u32,
        next: u32,
    }

    impl SourceReader for Counting {
        fn try_read_block(&mut self) -> Result<Option<Block>, Fault> {
            if self.left == 0 {
                return Ok(None);
            }
            self.left -= 1;
            self.next += 1;
            Ok(Some(Block::new(self.next - 1, vec![7u8; 10])))
        }
    }

    struct Double;

    impl BlockTransform for Double {
        fn transform(&mut self, block: Block) -> Result<Block, Fault> {
            let mut v = block.payload.to_vec();
            v.extend_from_slice(&block.payload);
            Ok(block.with_payload(v))
        }

        fn stage(&self) -> Stage {
            Stage::Compress
        }
    }

    #[derive(Clone, Default)]
    struct Collect {
        seen: Arc<Mutex<Vec<Block>>>,
        finished: Arc<Mutex<bool>>,
    }

    impl TargetWriter for Collect {
        fn write_block(&mut self, block: Block) -> Result<(), Fault> {
            self.seen.lock().push(block);
            Ok(())
        }

        fn finish(&mut self) -> Result<(), Fault> {
            *self.finished.lock() = true;
            Ok(())
        }
    }

    #[test]
    fn three_stage_chain_moves_every_block() {
        let lc = Arc::new(Lifecycle::new());
        let q_in = BoundedQueue::new(2, 1, lc.token()).unwrap();
        let q_out = BoundedQueue::new(2, 1, lc.token()).unwrap();
        let sink = Collect::default();

        let mut reader = Worker::reader(Box::new(Counting { left: 5, next: 0 }), q_in.clone(), lc.clone());
        let mut worker = Worker::transformer(0, Box::new(Double), q_in, q_out.clone(), lc.clone());
        let mut writer = Worker::writer(q_out, Box::new(sink.clone()), lc.clone());

        assert_eq!(reader.state(), WorkerState::Created);
        for w in [&mut writer, &mut worker, &mut reader] {
            w.start().unwrap();
        }

        let reports: Vec<_> = [&mut reader, &mut worker, &mut writer]
            .into_iter()
            .map(|w| w.join().unwrap())
            .collect();

        assert!(reports.iter().all(|r| r.outcome == WorkerOutcome::Completed));
        assert_eq!(reader.state(), WorkerState::Completed);
        assert_eq!(reports[0].counters.blocks_read, 5);
        assert_eq!(reports[1].counters.bytes_transformed_out, 100);
        assert_eq!(reports[2].counters.blocks_written, 5);
        assert_eq!(reports[1].name, "WORKER-0");

        let seen = sink.seen.lock();
        let indices: Vec<u32> = seen.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(seen.iter().all(|b| b.len() == 20));
        assert!(*sink.finished.lock());
        assert!(lc.faults().is_empty());
    }

    #[test]
    fn worker_starts_only_once() {
        let lc = Arc::new(Lifecycle::new());
        let q = BoundedQueue::new(4, 1, lc.token()).unwrap();
        let mut reader = Worker::reader(Box::new(Counting { left: 1, next: 0 }), q.clone(), lc);
        reader.start().unwrap();
        assert!(matches!(reader.start(), Err(Fault::Configuration(_))));
        assert!(reader.join().is_some());
        assert!(reader.join().is_none());
    }

    #[test]
    fn unstarted_worker_joins_to_none() {
        let lc = Arc::new(Lifecycle::new());
        let q = BoundedQueue::new(4, 1, lc.token()).unwrap();
        let mut w = Worker::writer(q, Box::new(Collect::default()), lc);
        assert!(w.join().is_none());
        assert_eq!(w.state(), WorkerState::Created);
    }

    #[test]
    fn fault_is_recorded_and_skips_finish() {
        struct Refuse;
        impl TargetWriter for Refuse {
            fn write_block(&mut self, _: Block) -> Result<(), Fault> {
                Err(Fault::Configuration("nope".into()))
            }
            fn finish(&mut self) -> Result<(), Fault> {
                panic!("finish must not run after a fault");
            }
        }

        let lc = Arc::new(Lifecycle::new());
        let q = BoundedQueue::new(4, 1, lc.token()).unwrap();
        q.enqueue(Block::new(0, b"a".to_vec())).unwrap();
        q.mark_producer_done().unwrap();

        let mut w = Worker::new("WRITER", Inlet::Queue(q), None, Outlet::Target(Box::new(Refuse)), lc.clone());
        w.start().unwrap();
        let report = w.join().unwrap();

        assert_eq!(report.outcome, WorkerOutcome::Faulted);
        assert_eq!(w.state(), WorkerState::Faulted);
        assert_eq!(lc.fault_count(), 1);
        assert!(lc.is_cancelled());
    }

    #[test]
    fn cancellation_is_not_a_fault() {
        let lc = Arc::new(Lifecycle::new());
        let q = BoundedQueue::new(4, 1, lc.token()).unwrap();
        let mut w = Worker::writer(q, Box::new(Collect::default()), lc.clone());
        w.start().unwrap();
        lc.cancel();

        let report = w.join().unwrap();
        assert_eq!(report.outcome, WorkerOutcome::Cancelled);
        assert_eq!(w.state(), WorkerState::Cancelled);
        assert!(lc.faults().is_empty());
    }
}
