use criterion::{criterion_group, criterion_main, Criterion};
use detpost::lowlevel::{extract, suppress, ExtractParams};
use detpost::{DetectionConfig, DetectionPipeline, FitPolicy, GeometryContext, TensorView};
use std::hint::black_box;

const NUM_CLASSES: usize = 80;
const ANCHORS: usize = 8400;

/// Deterministic 84 x 8400 head with roughly one confident anchor in 64,
/// clustered so NMS has overlapping boxes to resolve.
fn make_head() -> Vec<f32> {
    let channels = 4 + NUM_CLASSES;
    let mut data = vec![0.0f32; channels * ANCHORS];
    for a in 0..ANCHORS {
        let cell = (a % 80) as f32;
        let row = (a / 80 % 80) as f32;
        data[a] = cell * 8.0 + 4.0;
        data[ANCHORS + a] = row * 8.0 + 4.0;
        data[2 * ANCHORS + a] = 16.0 + ((a * 7) % 96) as f32;
        data[3 * ANCHORS + a] = 16.0 + ((a * 11) % 96) as f32;
        for c in 0..NUM_CLASSES {
            let noise = ((a * 31 + c * 17) & 0xFF) as f32 / 1280.0;
            data[(4 + c) * ANCHORS + a] = noise;
        }
        if a % 64 == 0 {
            let class = (a / 64) % NUM_CLASSES;
            data[(4 + class) * ANCHORS + a] = 0.5 + ((a / 64) % 50) as f32 / 100.0;
        }
    }
    data
}

fn bench_pipeline(c: &mut Criterion) {
    let data = make_head();
    let view = TensorView::new(&data, 4 + NUM_CLASSES, ANCHORS).unwrap();
    let config = DetectionConfig::default();
    let params: ExtractParams = config.extract_params();
    let ctx = GeometryContext::new(640.0, 390.0, 844.0, FitPolicy::AspectFitLetterbox);

    c.bench_function("extract_84x8400", |b| {
        b.iter(|| black_box(extract(view, NUM_CLASSES, params).unwrap()));
    });

    let candidates = extract(view, NUM_CLASSES, params).unwrap();
    c.bench_function("suppress_class_agnostic", |b| {
        b.iter(|| black_box(suppress(candidates.clone(), config.iou_threshold)));
    });

    let pipeline = DetectionPipeline::new();
    c.bench_function("pipeline_run_84x8400", |b| {
        b.iter(|| black_box(pipeline.run(view, NUM_CLASSES, &config, &ctx).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let pipeline_par = DetectionPipeline::new().with_parallel(true);
        c.bench_function("pipeline_run_84x8400_parallel", |b| {
            b.iter(|| black_box(pipeline_par.run(view, NUM_CLASSES, &config, &ctx).unwrap()));
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
