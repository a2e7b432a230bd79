use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tondo::circle;

fn bench_area(c: &mut Criterion) {
    c.bench_function("area f64", |b| b.iter(|| circle::area(black_box(5.0_f64))));
    c.bench_function("area f32", |b| b.iter(|| circle::area(black_box(5.0_f32))));
}

criterion_group!(benches, bench_area);
criterion_main!(benches);
