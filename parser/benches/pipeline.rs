use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use formula_parser::{parse, tokenize};

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let inputs = [
        ("names", "alpha beta gamma delta epsilon zeta eta theta iota kappa"),
        ("numbers", "42 1_000_000 3.14 2.718e10 0xFF 0o17 1.23e-5 9_999.5"),
        ("strings", r#""hello" 'world' "tab\tsep" "quote \" inside" 'it\'s'"#),
        ("operators", "a == b != c <= d >= e < f > g + h - i * j / k"),
    ];

    for (name, source) in inputs {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("kind", name), &source, |b, source| {
            b.iter(|| tokenize(black_box(source)).unwrap());
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let line = "a = (a * a) + 2 * (a * b) + b * b - c / d >= e == !flag\n";
    for lines in [1usize, 10, 100] {
        let source = line.repeat(lines);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("lines", lines), &source, |b, source| {
            b.iter(|| parse(black_box(source)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
