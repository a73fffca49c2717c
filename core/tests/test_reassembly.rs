#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use blockzip_core::stream::io::{OrderedBlockWriter, SharedBufferWriter};
    use blockzip_core::stream::{Block, TargetWriter};
    use blockzip_core::types::Fault;

    fn writer() -> (OrderedBlockWriter<SharedBufferWriter>, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (OrderedBlockWriter::new(SharedBufferWriter::new(buf.clone())), buf)
    }

    fn block(index: u32) -> Block {
        Block::new(index, vec![b'a' + index as u8; 3])
    }

    #[test]
    fn out_of_order_blocks_flush_in_index_order() {
        let (mut w, sink) = writer();

        w.write_block(block(3)).unwrap();
        w.write_block(block(1)).unwrap();
        assert!(sink.lock().is_empty(), "nothing may flush before block 0");
        assert_eq!(w.pending_len(), 2);
        assert_eq!(w.next_expected(), 0);

        w.write_block(block(0)).unwrap();
        assert_eq!(sink.lock().as_slice(), b"aaabbb");
        assert_eq!(w.next_expected(), 2);
        assert_eq!(w.pending_len(), 1);

        w.write_block(block(2)).unwrap();
        assert_eq!(sink.lock().as_slice(), b"aaabbbcccddd");
        assert_eq!(w.next_expected(), 4);
        assert_eq!(w.pending_len(), 0);

        TargetWriter::finish(&mut w).unwrap();
    }

    #[test]
    fn reversed_input_is_fully_restored() {
        let (mut w, sink) = writer();
        for i in (0..50u32).rev() {
            w.push(Block::new(i, vec![i as u8])).unwrap();
        }
        w.finish().unwrap();
        assert_eq!(sink.lock().clone(), (0..50u8).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_pending_index_is_rejected() {
        let (mut w, _) = writer();
        w.push(block(2)).unwrap();
        let err = w.push(block(2)).unwrap_err();
        assert!(matches!(err, Fault::DuplicateBlock { index: 2, next_expected: 0 }));
    }

    #[test]
    fn already_flushed_index_is_rejected() {
        let (mut w, _) = writer();
        w.push(block(0)).unwrap();
        w.push(block(1)).unwrap();
        let err = w.push(block(0)).unwrap_err();
        assert!(matches!(err, Fault::DuplicateBlock { index: 0, next_expected: 2 }));
    }

    #[test]
    fn finish_with_a_gap_is_a_fault() {
        let (mut w, sink) = writer();
        w.push(block(0)).unwrap();
        w.push(block(2)).unwrap();
        w.push(block(3)).unwrap();

        let err = w.finish().unwrap_err();
        match err {
            Fault::ReassemblyGap { next_expected, pending, lowest } => {
                assert_eq!(next_expected, 1);
                assert_eq!(pending, 2);
                assert_eq!(lowest, 2);
            }
            other => panic!("expected ReassemblyGap, got {other}"),
        }
        assert_eq!(sink.lock().as_slice(), b"aaa");
    }

    #[test]
    fn finish_on_empty_stream_succeeds() {
        let (mut w, sink) = writer();
        w.finish().unwrap();
        assert!(sink.lock().is_empty());
    }
}
