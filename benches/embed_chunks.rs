use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use swelld::export::avatar::placeholder_avatar;
use swelld::png_text::{embed_text_chunks, TextChunk};

fn make_chunks(payload_len: usize) -> Vec<TextChunk> {
    let json = format!("{{\"data\":\"{}\"}}", "x".repeat(payload_len));
    vec![
        TextChunk::new("chara", json.clone()),
        TextChunk::new("ccv3", json),
    ]
}

fn bench_embed_chunks(c: &mut Criterion) {
    let base = placeholder_avatar("Benchmark");
    let mut group = c.benchmark_group("embed_text_chunks");

    for payload_len in [256usize, 4096, 65536] {
        let chunks = make_chunks(payload_len);
        group.throughput(Throughput::Bytes(payload_len as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(payload_len),
            &chunks,
            |b, chunks| {
                b.iter(|| embed_text_chunks(&base, chunks).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_embed_chunks);
criterion_main!(benches);
