use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use char_viewer::{EncodingChoice, EncodingResolver, TextEncoding};

fn create_log_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("2024-01-01 12:00:{:02} INFO 九联电力 设备 {} 上报数据成功\n", i % 60, i))
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let resolver = EncodingResolver::default();

    for lines in [10usize, 1000] {
        let text = create_log_text(lines);
        let utf8 = text.clone().into_bytes();
        let (gbk, _) = TextEncoding::Gbk.encode(&text);

        group.bench_with_input(BenchmarkId::new("utf8_fast_path", lines), &utf8, |b, bytes| {
            b.iter(|| resolver.resolve(black_box(bytes), EncodingChoice::Auto))
        });

        group.bench_with_input(BenchmarkId::new("gbk_scored", lines), &gbk, |b, bytes| {
            b.iter(|| resolver.resolve(black_box(bytes), EncodingChoice::Auto))
        });

        group.bench_with_input(BenchmarkId::new("override", lines), &gbk, |b, bytes| {
            b.iter(|| {
                resolver.resolve(
                    black_box(bytes),
                    EncodingChoice::Fixed(TextEncoding::Gbk),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
