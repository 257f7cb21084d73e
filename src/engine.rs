use crate::config::Config;
use crate::model::{Individual, Pathogen, Population};
use crate::report::{EventSink, Interaction, RunMetadata, RunSummary, StepSummary};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Uniform};

/// Number of interactions every spreader performs per step.
const CONTACTS_PER_SPREADER: usize = 100;

/// Bound on random partner draws before falling back to a linear scan.
///
/// Partner selection rejects dead candidates, and rejection sampling
/// alone has no upper bound once most of the population is dead.
const MAX_PARTNER_DRAWS: usize = 64;

/// Simulation engine.
///
/// Owns the population, the pathogen, and the random number generator,
/// and drives discrete time steps until no one is left who is both alive
/// and unvaccinated. Each step runs three phases in fixed order: bounded
/// interactions for every spreader, mortality resolution of existing
/// infections, and commit of the infections acquired this step. The
/// phase order gives every exposure one full step of latency before its
/// outcome is decided.
#[derive(Debug)]
pub struct Engine {
    pathogen: Pathogen,
    population: Population,
    rng: ChaCha12Rng,
    partner_dist: Uniform<usize>,
    transmission_dist: Bernoulli,
    vaccination_rate: f64,
    pending: Vec<usize>,
    pending_mark: Vec<bool>,
    total_ever_infected: usize,
    total_dead: usize,
    steps: usize,
}

impl Engine {
    /// Create a new `Engine` from a validated configuration.
    ///
    /// The generator is seeded from `[run] seed` when present and from
    /// the operating system otherwise.
    pub fn new(cfg: &Config) -> Result<Self> {
        cfg.validate().context("failed to validate config")?;

        let pathogen = Pathogen::new(
            &cfg.pathogen.name,
            cfg.pathogen.transmission_probability,
            cfg.pathogen.lethality_probability,
        )?;
        let population = Population::new(
            cfg.population.size,
            cfg.population.vaccination_rate,
            cfg.population.initial_infected,
            &pathogen,
        )?;

        let rng = match cfg.run.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let partner_dist = Uniform::new(0, population.len())?;
        let transmission_dist = Bernoulli::new(pathogen.transmission_probability())?;

        Ok(Self {
            pathogen,
            rng,
            partner_dist,
            transmission_dist,
            vaccination_rate: cfg.population.vaccination_rate,
            pending: Vec::new(),
            pending_mark: vec![false; population.len()],
            total_ever_infected: cfg.population.initial_infected,
            total_dead: 0,
            steps: 0,
            population,
        })
    }

    /// Run the simulation to completion.
    ///
    /// Emits run metadata once, an interaction record per interaction,
    /// a step summary after every step, and a final run summary. The run
    /// ends when no individual is both alive and unvaccinated, or when
    /// no infections remain to drive further change while unvaccinated
    /// survivors are left (the epidemic died out).
    pub fn run(&mut self, sink: &mut dyn EventSink) -> Result<RunSummary> {
        sink.record_run_metadata(&self.metadata())
            .context("failed to record run metadata")?;

        while self.population.any_living_unvaccinated() {
            if self.population.currently_infected() == 0 {
                log::info!("epidemic died out with unvaccinated survivors");
                break;
            }

            self.perform_step(sink).context("failed to perform step")?;
            self.steps += 1;

            sink.record_step_summary(&self.step_summary())
                .context("failed to record step summary")?;
        }

        let summary = self.summary();
        sink.record_run_summary(&summary)
            .context("failed to record run summary")?;
        Ok(summary)
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.steps,
            living: self.population.living(),
            dead: self.population.dead(),
            vaccinated: self.population.vaccinated(),
            currently_infected: self.population.currently_infected(),
            total_ever_infected: self.total_ever_infected,
            total_dead: self.total_dead,
        }
    }

    fn metadata(&self) -> RunMetadata {
        RunMetadata {
            pop_size: self.population.len(),
            vaccination_rate: self.vaccination_rate,
            pathogen_name: self.pathogen.name().to_string(),
            lethality_probability: self.pathogen.lethality_probability(),
            transmission_probability: self.pathogen.transmission_probability(),
        }
    }

    fn step_summary(&self) -> StepSummary {
        StepSummary {
            step_index: self.steps,
            living: self.population.living(),
            dead: self.population.dead(),
            vaccinated: self.population.vaccinated(),
            currently_infected: self.population.currently_infected(),
        }
    }

    fn perform_step(&mut self, sink: &mut dyn EventSink) -> Result<()> {
        // Existing infections resolve before the ones acquired this step
        // commit, so every exposure survives at least one full step.
        if self.interaction_phase(sink)? {
            return Ok(());
        }
        self.resolve_infections();
        self.commit_pending_infections();
        Ok(())
    }

    /// Run the interaction phase for every spreader.
    ///
    /// Returns true if the termination condition became true mid-phase,
    /// in which case the rest of the step is skipped.
    fn interaction_phase(&mut self, sink: &mut dyn EventSink) -> Result<bool> {
        let spreaders: Vec<usize> = self
            .population
            .iter()
            .filter(|ind| ind.is_alive() && !ind.is_vaccinated() && ind.is_infected())
            .map(Individual::id)
            .collect();

        for spreader in spreaders {
            for _ in 0..CONTACTS_PER_SPREADER {
                if !self.population.any_living_unvaccinated() {
                    return Ok(true);
                }
                let Some(partner) = self.choose_partner(spreader) else {
                    // No other living individual exists, so no spreader
                    // can interact with anyone.
                    return Ok(false);
                };
                self.interact(spreader, partner, sink)?;
            }
        }

        Ok(false)
    }

    /// Pick a living partner other than the spreader, uniformly with
    /// replacement. Dead candidates are redrawn and do not count as
    /// interactions; after [`MAX_PARTNER_DRAWS`] rejections the search
    /// degrades to a scan from a random offset.
    fn choose_partner(&mut self, spreader: usize) -> Option<usize> {
        for _ in 0..MAX_PARTNER_DRAWS {
            let candidate = self.partner_dist.sample(&mut self.rng);
            if candidate != spreader && self.population.individual(candidate).is_alive() {
                return Some(candidate);
            }
        }

        let len = self.population.len();
        let start = self.partner_dist.sample(&mut self.rng);
        for offset in 0..len {
            let candidate = (start + offset) % len;
            if candidate != spreader && self.population.individual(candidate).is_alive() {
                return Some(candidate);
            }
        }

        None
    }

    fn interact(
        &mut self,
        spreader: usize,
        partner: usize,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let other = self.population.individual(partner);
        let partner_was_infected = other.is_infected();
        let partner_was_vaccinated = other.is_vaccinated();

        // Only a healthy, unvaccinated partner can be exposed. A partner
        // already pending still takes a transmission draw, but is marked
        // at most once.
        let mut transmission_occurred = false;
        if !partner_was_vaccinated && !partner_was_infected {
            transmission_occurred = self.transmission_dist.sample(&mut self.rng);
            if transmission_occurred && !self.pending_mark[partner] {
                self.pending_mark[partner] = true;
                self.pending.push(partner);
            }
        }

        sink.record_interaction(&Interaction {
            spreader_id: spreader,
            partner_id: partner,
            partner_was_infected,
            partner_was_vaccinated,
            transmission_occurred,
        })
        .context("failed to record interaction")
    }

    /// Resolve every infection acquired in a previous step: one
    /// mortality draw per infected individual.
    fn resolve_infections(&mut self) {
        for id in 0..self.population.len() {
            let individual = self.population.individual_mut(id);
            if individual.is_infected() && !individual.resolve_infection(&mut self.rng) {
                self.total_dead += 1;
            }
        }
    }

    /// Convert this step's pending exposures into active infections.
    fn commit_pending_infections(&mut self) {
        for &id in &self.pending {
            self.pending_mark[id] = false;
            self.population.individual_mut(id).infect(self.pathogen.clone());
        }
        self.total_ever_infected += self.pending.len();
        self.pending.clear();
    }
}
