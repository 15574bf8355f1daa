use criterion::{BatchSize, Criterion};
use ride::{
    config::{Config, EvolutionConfig},
    generation::Generation,
    random::seeded_rng,
    Evolver, Population, Scenario,
};

fn setup() -> (Scenario, Population) {
    let mut config = Config::default();
    config.evolution = EvolutionConfig {
        population: 30,
        seed: Some(7),
        ..Default::default()
    };
    let scenario = Scenario::from_config(&config).unwrap();
    let population = Population::new(scenario.io().0, &config.evolution);
    (scenario, population)
}

fn bench_generation(bench: &mut Criterion) {
    let (scenario, mut population) = setup();

    bench.bench_function("tick-30", |b| {
        b.iter_batched(
            || {
                let mut rng = seeded_rng(Some(1));
                Generation::new(scenario.spawn(population.spawn().unwrap(), &mut rng))
            },
            |mut generation| generation.tick(&scenario),
            BatchSize::SmallInput,
        )
    });

    bench.bench_function("generation-30", |b| {
        b.iter_batched(
            || population.spawn().unwrap(),
            |networks| {
                let mut rng = seeded_rng(Some(1));
                let mut state = Default::default();
                scenario
                    .run_generation(networks, &mut state, &mut (), &mut rng)
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(100)
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
    bench_generation(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
