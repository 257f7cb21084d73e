use crate::errors::{SimError, check_num};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub population: PopulationConfig,
    pub pathogen: PathogenConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals in the population.
    pub size: usize,
    /// Fraction of the population vaccinated at the start.
    pub vaccination_rate: f64,
    /// Number of individuals infected at the start.
    #[serde(default = "default_initial_infected")]
    pub initial_infected: usize,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PathogenConfig {
    /// Name of the simulated pathogen.
    pub name: String,
    /// Chance that an exposure converts to an infection.
    pub transmission_probability: f64,
    /// Chance that an infected individual dies before recovering.
    pub lethality_probability: f64,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed for the random number generator.
    ///
    /// Runs with the same seed are reproducible; when absent, the seed
    /// is drawn from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_initial_infected() -> usize {
    1
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), SimError> {
        check_num("population size", self.population.size, 1..10_000_000)?;
        check_num(
            "vaccination rate",
            self.population.vaccination_rate,
            0.0..=1.0,
        )?;
        check_num(
            "initial infected",
            self.population.initial_infected,
            ..=self.population.size,
        )?;

        check_num(
            "transmission probability",
            self.pathogen.transmission_probability,
            0.0..=1.0,
        )?;
        check_num(
            "lethality probability",
            self.pathogen.lethality_probability,
            0.0..=1.0,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            population: PopulationConfig {
                size: 100,
                vaccination_rate: 0.5,
                initial_infected: 1,
            },
            pathogen: PathogenConfig {
                name: "Dysentery".to_string(),
                transmission_probability: 0.7,
                lethality_probability: 0.2,
            },
            run: RunConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn out_of_range_rate_fails_validation() {
        let mut config = base_config();
        config.population.vaccination_rate = 1.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn initial_infected_above_size_fails_validation() {
        let mut config = base_config();
        config.population.initial_infected = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn initial_infected_defaults_to_one() {
        let toml_str = r#"
            [population]
            size = 50
            vaccination_rate = 0.2

            [pathogen]
            name = "Sniffles"
            transmission_probability = 0.1
            lethality_probability = 0.05
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.population.initial_infected, 1);
        assert_eq!(config.run.seed, None);
    }
}
