use criterion::Criterion;
use ride::{
    bitmap::{Bitmap, Rgba},
    border::Border,
    geometry::Point,
    radar::{probe, Radar},
    sprite::Sprite,
    vehicle::{Handling, Vehicle},
};
use std::sync::Arc;

const OPEN: Rgba = Rgba::new(255, 255, 255, 0);
const WALL: Rgba = Rgba::new(0, 0, 0, 255);

fn track() -> Border {
    Border::new(
        Point::default(),
        Bitmap::oval_track(800, 600, 110, OPEN, WALL),
        OPEN,
    )
}

fn bench_radar(bench: &mut Criterion) {
    let border = track();
    let radar = Radar::new(vec![90., 60., 45., 30., 0., -30., -45., -60., -90.], 200);
    let mut car = Vehicle::new(
        400.,
        60.,
        Arc::new(Sprite::solid(0, 22, 12)),
        Handling::default(),
        radar.len(),
    );

    bench.bench_function("probe-far", |b| {
        b.iter(|| probe(Point::new(411, 66), 0., &border, 200))
    });
    bench.bench_function("radar-sense-9", |b| b.iter(|| radar.sense(&mut car, &border)));
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_radar(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
