use criterion::{criterion_group, criterion_main, Criterion};
use julia_explorer::{cpu::CpuRenderer, screen::Size, view::Limits, ViewParams};

fn cpu_frame(c: &mut Criterion) {
    let params = ViewParams::new(Size::new(320, 240), Limits::default());
    let single = CpuRenderer::new(1).unwrap();
    let all = CpuRenderer::new(num_cpus::get()).unwrap();

    c.bench_function("cpu 320x240 1 thread", |b| b.iter(|| single.render(&params)));
    c.bench_function("cpu 320x240 all threads", |b| b.iter(|| all.render(&params)));
}

criterion_group!(benches, cpu_frame);
criterion_main!(benches);
