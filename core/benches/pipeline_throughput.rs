use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blockzip_core::prelude::*;

const DATA_LEN: usize = 8 * 1024 * 1024;

/// Semi-compressible input: repeating text with a counter mixed in.
fn test_data(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut i = 0u64;
    while out.len() < len {
        out.extend_from_slice(format!("block pipeline line {i} ").as_bytes());
        i += 1;
    }
    out.truncate(len);
    out
}

fn config(codec: CompressionCodec, workers: usize) -> PipelineConfig {
    PipelineConfig::default()
        .with_block_size(256 * 1024)
        .with_workers(workers)
        .with_codec(codec, None)
}

fn bench_compress(c: &mut Criterion) {
    let data = test_data(DATA_LEN);
    let mut group = c.benchmark_group("compress");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for codec in CompressionCodec::ALL {
        for workers in [1usize, 4] {
            let cfg = config(codec, workers);
            group.bench_with_input(BenchmarkId::new(codec.name(), workers), &data, |b, data| {
                b.iter(|| compress(InputSource::Memory(data.clone()), OutputSink::Memory, &cfg).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let data = test_data(DATA_LEN);
    let mut group = c.benchmark_group("decompress");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for codec in CompressionCodec::ALL {
        let cfg = config(codec, 4);
        let packed = compress(InputSource::Memory(data.clone()), OutputSink::Memory, &cfg)
            .unwrap()
            .output
            .unwrap();
        group.bench_function(BenchmarkId::new(codec.name(), 4), |b| {
            b.iter(|| decompress(InputSource::Memory(packed.clone()), OutputSink::Memory, &cfg).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
