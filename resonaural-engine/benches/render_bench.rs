//! Render throughput of the binaural graph.
//!
//! Run with: cargo bench --bench render_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use resonaural_engine::{
    BinauralEngine, BrainwaveState, EngineConfig, ManualClock, OfflineBackend, ResonancePayload,
};

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_interleaved");

    for frames in [128usize, 512, 2048] {
        let mut engine =
            BinauralEngine::with_clock(OfflineBackend::new(48_000), EngineConfig::manual(), ManualClock::new());
        engine.init().expect("offline init");
        engine.set_brainwave_state(BrainwaveState::Gamma, 0.8);
        engine.set_intensity(1.0);
        for _ in 0..50 {
            engine.tick();
        }
        let mut buf = vec![0.0f32; frames * 2];

        group.bench_with_input(BenchmarkId::new("steady", frames), &frames, |b, _| {
            let dev = engine.device().expect("active");
            b.iter(|| {
                dev.render(black_box(&mut buf), 2);
            });
        });

        group.bench_with_input(BenchmarkId::new("with_ramps", frames), &frames, |b, _| {
            let payload = ResonancePayload::with_resonance(0.9)
                .pattern("high_resonance")
                .pattern("expansive_collective");
            let dev = engine.device().expect("active");
            b.iter(|| {
                engine.update_from_resonance(&payload);
                dev.render(black_box(&mut buf), 2);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
