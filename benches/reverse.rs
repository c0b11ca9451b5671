use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sx::handler::Recorder;
use sx::reverse::reverse_pattern;
use sx::{Config, Pipeline};

fn bench_reverse_pattern(c: &mut Criterion) {
    let simple = "hello";
    let complex = r"(?i)^(?P<key>[a-z_][a-z0-9_]*)\s*=\s*(?-i:TRUE|FALSE|\d{1,3}(?:\.\d+)?)$";

    c.bench_function("reverse_simple", |b| {
        b.iter(|| black_box(reverse_pattern(black_box(simple)).unwrap()))
    });

    c.bench_function("reverse_complex", |b| {
        b.iter(|| black_box(reverse_pattern(black_box(complex)).unwrap()))
    });
}

fn bench_backward_address(c: &mut Criterion) {
    let text: String = (0..10_000)
        .map(|i| format!("key{} = value{}\n", i, i))
        .collect();
    let pipeline = Pipeline::from_command("?^key[0-9]+?", Config::default()).unwrap();

    c.bench_function("backward_address_10k", |b| {
        b.iter(|| black_box(pipeline.execute_all(text.as_bytes(), &mut Recorder::new())))
    });
}

criterion_group!(benches, bench_reverse_pattern, bench_backward_address);
criterion_main!(benches);
