//! Population state: the pathogen, individuals, and the arena holding them.

use crate::errors::{SimError, check_num};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Infectious agent parameters.
///
/// Immutable after construction; every infected individual carries a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pathogen {
    name: String,
    transmission_probability: f64,
    lethality_probability: f64,
}

impl Pathogen {
    /// Create a new pathogen.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidParameter`] if either probability lies
    /// outside `[0, 1]`.
    pub fn new(
        name: &str,
        transmission_probability: f64,
        lethality_probability: f64,
    ) -> Result<Self, SimError> {
        check_num(
            "transmission probability",
            transmission_probability,
            0.0..=1.0,
        )?;
        check_num("lethality probability", lethality_probability, 0.0..=1.0)?;
        Ok(Self {
            name: name.to_string(),
            transmission_probability,
            lethality_probability,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transmission_probability(&self) -> f64 {
        self.transmission_probability
    }

    pub fn lethality_probability(&self) -> f64 {
        self.lethality_probability
    }
}

/// One member of the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    id: usize,
    is_alive: bool,
    is_vaccinated: bool,
    infection: Option<Pathogen>,
}

impl Individual {
    pub fn new(id: usize, is_vaccinated: bool, infection: Option<Pathogen>) -> Self {
        Self {
            id,
            is_alive: true,
            is_vaccinated,
            infection,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn is_vaccinated(&self) -> bool {
        self.is_vaccinated
    }

    pub fn is_infected(&self) -> bool {
        self.infection.is_some()
    }

    pub fn infect(&mut self, pathogen: Pathogen) {
        debug_assert!(self.is_alive && !self.is_vaccinated);
        self.infection = Some(pathogen);
    }

    /// Resolve the current infection with a single mortality draw.
    ///
    /// Uninfected individuals are left untouched and survive trivially.
    /// An infected individual dies if a uniform draw in `[0, 1)` falls
    /// below the pathogen's lethality; a survivor clears the infection
    /// and becomes vaccinated. Returns whether the individual survived.
    pub fn resolve_infection<R: Rng>(&mut self, rng: &mut R) -> bool {
        let Some(pathogen) = self.infection.take() else {
            return true;
        };
        if rng.random::<f64>() < pathogen.lethality_probability() {
            self.is_alive = false;
            false
        } else {
            self.is_vaccinated = true;
            true
        }
    }
}

/// Fixed-size arena of individuals.
///
/// The identity of an individual equals its index, so partner selection
/// and pending-infection bookkeeping work on plain indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Build the initial population.
    ///
    /// The arena is partitioned into `initial_infected` unvaccinated
    /// infected individuals, `floor(vaccination_rate * size)` vaccinated
    /// ones, and a healthy unvaccinated remainder, with ascending ids.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidParameter`] if `size` is zero, a
    /// parameter is out of range, or the groups do not fit in `size`.
    pub fn new(
        size: usize,
        vaccination_rate: f64,
        initial_infected: usize,
        pathogen: &Pathogen,
    ) -> Result<Self, SimError> {
        check_num("population size", size, 1..)?;
        check_num("vaccination rate", vaccination_rate, 0.0..=1.0)?;
        check_num("initial infected", initial_infected, ..=size)?;

        let vaccinated = (vaccination_rate * size as f64).floor() as usize;
        let healthy = size
            .checked_sub(initial_infected)
            .and_then(|rest| rest.checked_sub(vaccinated))
            .ok_or_else(|| {
                SimError::InvalidParameter(format!(
                    "{initial_infected} infected and {vaccinated} vaccinated \
                     do not fit in a population of {size}"
                ))
            })?;

        let mut individuals = Vec::with_capacity(size);
        for _ in 0..initial_infected {
            individuals.push(Individual::new(
                individuals.len(),
                false,
                Some(pathogen.clone()),
            ));
        }
        for _ in 0..vaccinated {
            individuals.push(Individual::new(individuals.len(), true, None));
        }
        for _ in 0..healthy {
            individuals.push(Individual::new(individuals.len(), false, None));
        }

        Ok(Self { individuals })
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn individual(&self, id: usize) -> &Individual {
        &self.individuals[id]
    }

    pub fn individual_mut(&mut self, id: usize) -> &mut Individual {
        &mut self.individuals[id]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.individuals.iter()
    }

    pub fn living(&self) -> usize {
        self.individuals.iter().filter(|ind| ind.is_alive()).count()
    }

    pub fn dead(&self) -> usize {
        self.individuals.len() - self.living()
    }

    pub fn vaccinated(&self) -> usize {
        self.individuals
            .iter()
            .filter(|ind| ind.is_vaccinated())
            .count()
    }

    pub fn currently_infected(&self) -> usize {
        self.individuals
            .iter()
            .filter(|ind| ind.is_infected())
            .count()
    }

    /// The simulation keeps running while anyone is both alive and
    /// unvaccinated. Exactly this predicate, not "no infections remain":
    /// the two differ when infected individuals die mid-run.
    pub fn any_living_unvaccinated(&self) -> bool {
        self.individuals
            .iter()
            .any(|ind| ind.is_alive() && !ind.is_vaccinated())
    }
}
