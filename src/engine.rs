use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, ExperimentConfig, SimulationConfig};
use crate::population::YearUpdater;
use crate::rainfall::RainfallStatistics;
use crate::rng::RngManager;
use crate::tree::{JoshuaTree, TreeTraits};
use crate::weather::{WeatherError, WeatherSample, WeatherSampler};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Per-year record handed to `TrialRunner::run_with_hook`.
#[derive(Clone, Debug, Serialize)]
pub struct YearSummary {
    pub year: u32,
    pub weather: WeatherSample,
    pub deaths: usize,
    pub germinated: u64,
    pub net_germination: i64,
    pub population: usize,
    pub seed_bank: f64,
    pub seed_bank_after_attrition: f64,
}

/// Runs one trial: a fixed number of sequential years.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    weather: WeatherSampler,
    updater: YearUpdater,
}

impl TrialRunner {
    pub fn new(weather: WeatherSampler, updater: YearUpdater) -> Self {
        Self { weather, updater }
    }

    pub fn traits(&self) -> &TreeTraits {
        self.updater.traits()
    }

    pub fn run<R: Rng + ?Sized>(&self, initial: Vec<JoshuaTree>, years: u32, rng: &mut R) -> usize {
        self.run_with_hook(initial, years, rng, |_| {})
    }

    /// Same as `run`, calling `hook` after every simulated year. Years after
    /// extinction are skipped and produce no summary.
    pub fn run_with_hook<R, F>(
        &self,
        initial: Vec<JoshuaTree>,
        years: u32,
        rng: &mut R,
        mut hook: F,
    ) -> usize
    where
        R: Rng + ?Sized,
        F: FnMut(&YearSummary),
    {
        let mut population = initial;
        for year in 1..=years {
            if population.is_empty() {
                debug!(year, "population extinct, skipping remaining years");
                break;
            }
            let weather = self.weather.sample_year(rng);
            let outcome = self.updater.advance(population, &weather, rng);
            population = outcome.population;

            let summary = YearSummary {
                year,
                weather,
                deaths: outcome.deaths,
                germinated: outcome.germinated,
                net_germination: outcome.net_germination,
                population: population.len(),
                seed_bank: population.iter().map(JoshuaTree::seeds).sum(),
                seed_bank_after_attrition: outcome.seed_bank_after_attrition,
            };
            debug!(
                year,
                rain = ?weather.rain,
                temperature = ?weather.temperature,
                deaths = summary.deaths,
                germinated = summary.germinated,
                population = summary.population,
                "year advanced"
            );
            hook(&summary);
        }
        population.len()
    }
}

/// Repeats independent trials from fresh founder cohorts.
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    trial: TrialRunner,
    experiment: ExperimentConfig,
}

impl ExperimentRunner {
    pub fn new(trial: TrialRunner, experiment: ExperimentConfig) -> Self {
        Self { trial, experiment }
    }

    /// Validates `config` first: an empty trait range would otherwise panic
    /// mid-trial.
    pub fn from_config(
        config: &SimulationConfig,
        stats: RainfallStatistics,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let weather = WeatherSampler::new(stats, config.climate.cold_year_prob)?;
        let updater = YearUpdater::new(stats, config.demography.clone(), config.tree.clone());
        Ok(Self::new(
            TrialRunner::new(weather, updater),
            config.experiment.clone(),
        ))
    }

    pub fn experiment(&self) -> &ExperimentConfig {
        &self.experiment
    }

    pub fn founders<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<JoshuaTree> {
        (0..self.experiment.mature_trees)
            .map(|_| JoshuaTree::founder(rng, self.trial.traits()))
            .collect()
    }

    /// Final population size of one trial, using that trial's own stream.
    pub fn run_trial(&self, rngs: &RngManager, trial: usize) -> usize {
        let mut rng = rngs.trial_rng(trial as u64);
        let founders = self.founders(&mut rng);
        let final_size = self.trial.run(founders, self.experiment.years, &mut rng);
        debug!(trial, final_size, "trial finished");
        final_size
    }

    /// One final size per trial, in trial order.
    pub fn run(&self, rngs: &RngManager) -> Vec<usize> {
        info!(
            trials = self.experiment.trials,
            mature_trees = self.experiment.mature_trees,
            years = self.experiment.years,
            seed = rngs.master_seed(),
            "starting experiment"
        );
        let sizes: Vec<usize> = (0..self.experiment.trials)
            .map(|trial| self.run_trial(rngs, trial))
            .collect();
        info!(trials = sizes.len(), "experiment finished");
        sizes
    }
}
