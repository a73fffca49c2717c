#[cfg(test)]
mod tests {
    use std::fs;

    use blockzip_core::compression::CompressionCodec;
    use blockzip_core::config::{Mode, PipelineConfig};
    use blockzip_core::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_QUEUE_CAPACITY, MAX_BLOCK_SIZE, MAX_WORKERS};
    use blockzip_core::stream::ParallelismProfile;
    use blockzip_core::types::Fault;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(cfg.profile.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(cfg.profile.workers, num_cpus::get().max(1));
        assert_eq!(cfg.codec, CompressionCodec::Gzip);
        assert!(cfg.level.is_none());
        assert!(!cfg.overwrite);
        cfg.validate().unwrap();
    }

    #[test]
    fn invalid_settings_are_configuration_faults() {
        let bad = [
            PipelineConfig::default().with_block_size(0),
            PipelineConfig::default().with_block_size(MAX_BLOCK_SIZE + 1),
            PipelineConfig::default().with_workers(0),
            PipelineConfig::default().with_workers(MAX_WORKERS + 1),
            PipelineConfig::default().with_queue_capacity(0),
            PipelineConfig::default().with_codec(CompressionCodec::Zstd, Some(99)),
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(Fault::Configuration(_))), "{cfg:?}");
        }
    }

    #[test]
    fn partial_json_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "block_size": 65536, "codec": "zstd", "profile": { "workers": 3 } }"#).unwrap();

        let cfg = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.block_size, 65536);
        assert_eq!(cfg.codec, CompressionCodec::Zstd);
        assert_eq!(cfg.profile.workers, 3);
        assert_eq!(cfg.profile.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(!cfg.overwrite);
    }

    #[test]
    fn malformed_json_is_a_configuration_fault() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "{ block_size: ").unwrap();
        assert!(matches!(PipelineConfig::from_json_file(&path), Err(Fault::Configuration(_))));
        assert!(matches!(
            PipelineConfig::from_json_file(dir.path().join("missing.json")),
            Err(Fault::Io(_))
        ));
    }

    #[test]
    fn config_serializes_round_trip() {
        let cfg = PipelineConfig::default()
            .with_block_size(4096)
            .with_workers(2)
            .with_codec(CompressionCodec::Lz4, None);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"lz4\""));
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn profiles_and_modes() {
        assert_eq!(ParallelismProfile::single_threaded(), ParallelismProfile::new(1, 1));
        assert!(ParallelismProfile::dynamic().workers >= 1);
        assert_eq!(Mode::Compress.to_string(), "compress");
        assert_eq!(serde_json::to_string(&Mode::Decompress).unwrap(), "\"decompress\"");
    }
}
