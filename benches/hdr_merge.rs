use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use bracket_hdr_rs::hdr_pipeline::{
    Bracket, ExposureFusionBlender, ExposureTime, Frame, RadianceRecoverer, RgbImage,
};

fn synthetic_bracket(width: usize, height: usize) -> Bracket {
    let exposures_s = [0.1, 0.4, 1.6];
    let frames = exposures_s
        .iter()
        .enumerate()
        .map(|(j, &t)| {
            let mut data = Vec::with_capacity(width * height * 3);
            for i in 0..width * height {
                let radiance = 0.05 + 0.95 * i as f64 / (width * height - 1) as f64;
                let z = (radiance * t * 255.0).round().clamp(0.0, 255.0) as u8;
                data.extend_from_slice(&[z, z, z]);
            }
            Frame::new(
                RgbImage::new(width, height, data).unwrap(),
                ExposureTime::from_micros(t * 1e6).unwrap(),
                j + 1,
            )
        })
        .collect();
    Bracket::new(frames).unwrap()
}

fn benchmark_radiance_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("radiance_recovery");

    for (width, height, label) in [(64, 64, "64x64"), (256, 256, "256x256")] {
        let bracket = synthetic_bracket(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(label), &bracket, |b, bracket| {
            let recoverer = RadianceRecoverer::default();
            b.iter(|| recoverer.recover(black_box(bracket)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_exposure_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("exposure_fusion");

    for (width, height, label) in [(64, 64, "64x64"), (256, 256, "256x256")] {
        let bracket = synthetic_bracket(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(label), &bracket, |b, bracket| {
            let blender = ExposureFusionBlender::default();
            b.iter(|| blender.blend(black_box(bracket)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_radiance_recovery,
    benchmark_exposure_fusion
);
criterion_main!(benches);
