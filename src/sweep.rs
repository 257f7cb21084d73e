//! Vaccination-rate sweep: replicated runs across coverage levels.
//!
//! The herd-immunity threshold is not computed directly; it shows up in
//! the aggregated outcomes as the coverage above which the infected and
//! dead fractions collapse to the initial seed.

use crate::config::Config;
use crate::engine::Engine;
use crate::errors::check_num;
use crate::report::NullSink;
use crate::stats::{Accumulator, AccumulatorReport};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Number of evenly spaced vaccination rates in `[0, 1]`.
    pub points: usize,
    /// Number of simulations per vaccination rate.
    pub replicates: usize,
}

/// Aggregated outcomes of the replicated runs at one vaccination rate.
#[derive(Debug, Serialize, Deserialize)]
pub struct SweepPoint {
    pub vaccination_rate: f64,
    pub replicates: usize,
    pub dead_fraction: AccumulatorReport,
    pub infected_fraction: AccumulatorReport,
    pub steps: AccumulatorReport,
}

/// Run the sweep and aggregate per-rate outcomes.
///
/// Every replicate is seeded from a parent generator, so a configured
/// `[run] seed` makes the whole sweep reproducible. Rates are capped so
/// the initially infected still fit in the population alongside the
/// vaccinated group.
pub fn run_sweep(cfg: &Config, opts: &SweepOptions) -> Result<Vec<SweepPoint>> {
    check_num("sweep points", opts.points, 2..=1001)?;
    check_num("sweep replicates", opts.replicates, 1..=100_000)?;
    cfg.validate().context("failed to validate config")?;

    let mut seeder = match cfg.run.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng()?,
    };

    let size = cfg.population.size;
    let max_rate = (size - cfg.population.initial_infected) as f64 / size as f64;

    let mut points = Vec::with_capacity(opts.points);
    for point in 0..opts.points {
        let vaccination_rate = (point as f64 / (opts.points - 1) as f64).min(max_rate);

        let mut dead_fraction = Accumulator::new();
        let mut infected_fraction = Accumulator::new();
        let mut steps = Accumulator::new();

        for _ in 0..opts.replicates {
            let mut run_cfg = cfg.clone();
            run_cfg.population.vaccination_rate = vaccination_rate;
            run_cfg.run.seed = Some(seeder.random());

            let mut engine = Engine::new(&run_cfg).context("failed to construct engine")?;
            let summary = engine
                .run(&mut NullSink)
                .with_context(|| format!("failed to run at rate {vaccination_rate}"))?;

            dead_fraction.add(summary.total_dead as f64 / size as f64);
            infected_fraction.add(summary.total_ever_infected as f64 / size as f64);
            steps.add(summary.steps as f64);
        }

        log::info!(
            "completed {} runs at vaccination rate {vaccination_rate:.3}",
            opts.replicates
        );

        points.push(SweepPoint {
            vaccination_rate,
            replicates: opts.replicates,
            dead_fraction: dead_fraction.report(),
            infected_fraction: infected_fraction.report(),
            steps: steps.report(),
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PathogenConfig, PopulationConfig, RunConfig};

    fn config(transmission: f64, lethality: f64) -> Config {
        Config {
            population: PopulationConfig {
                size: 40,
                vaccination_rate: 0.0,
                initial_infected: 2,
            },
            pathogen: PathogenConfig {
                name: "Sniffles".to_string(),
                transmission_probability: transmission,
                lethality_probability: lethality,
            },
            run: RunConfig { seed: Some(7) },
        }
    }

    #[test]
    fn sweep_covers_the_requested_rates() {
        let cfg = config(0.3, 0.4);
        let opts = SweepOptions {
            points: 3,
            replicates: 2,
        };
        let points = run_sweep(&cfg, &opts).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].vaccination_rate, 0.0);
        assert_eq!(points[1].vaccination_rate, 0.5);
        // Full coverage is capped so the infected seed still fits.
        assert_eq!(points[2].vaccination_rate, 38.0 / 40.0);
        assert!(points.iter().all(|point| point.replicates == 2));
    }

    #[test]
    fn seeded_sweeps_are_reproducible() {
        let cfg = config(0.2, 0.5);
        let opts = SweepOptions {
            points: 2,
            replicates: 3,
        };

        let first = run_sweep(&cfg, &opts).unwrap();
        let second = run_sweep(&cfg, &opts).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.dead_fraction.mean, b.dead_fraction.mean);
            assert_eq!(a.infected_fraction.mean, b.infected_fraction.mean);
            assert_eq!(a.steps.mean, b.steps.mean);
        }
    }

    #[test]
    fn zero_transmission_keeps_infections_at_the_seed() {
        let cfg = config(0.0, 0.5);
        let opts = SweepOptions {
            points: 2,
            replicates: 2,
        };
        let points = run_sweep(&cfg, &opts).unwrap();

        for point in points {
            assert!((point.infected_fraction.mean - 2.0 / 40.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sweep_rejects_a_single_point() {
        let cfg = config(0.2, 0.5);
        let opts = SweepOptions {
            points: 1,
            replicates: 2,
        };
        assert!(run_sweep(&cfg, &opts).is_err());
    }
}
