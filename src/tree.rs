//! Individual Joshua tree lifecycle.

use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DemographyConfig;
use crate::rainfall::RainfallStatistics;
use crate::rng::RngExt;
use crate::weather::{RainCategory, WeatherSample};

fn default_bloom_min() -> u32 {
    1
}

fn default_bloom_max() -> u32 {
    3
}

fn default_flower_min() -> u32 {
    24
}

fn default_flower_max() -> u32 {
    46
}

fn default_pollination_rate() -> f64 {
    0.8
}

fn default_seeds_per_flower() -> f64 {
    10.0
}

fn default_maturity_age() -> u32 {
    50
}

fn default_maturation_window() -> Range<u32> {
    50..60
}

fn default_senescence_window() -> Range<u32> {
    250..500
}

fn default_founder_ages() -> Range<u32> {
    50..61
}

/// Biological constants shared by every tree in an experiment.
///
/// Ranges are half-open, matching the integer draws they feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeTraits {
    #[serde(default = "default_bloom_min")]
    pub bloom_min: u32,
    #[serde(default = "default_bloom_max")]
    pub bloom_max: u32,
    #[serde(default = "default_flower_min")]
    pub flower_min: u32,
    #[serde(default = "default_flower_max")]
    pub flower_max: u32,
    #[serde(default = "default_pollination_rate")]
    pub pollination_rate: f64,
    #[serde(default = "default_seeds_per_flower")]
    pub seeds_per_flower: f64,
    /// Age at which a newly constructed tree already counts as mature.
    #[serde(default = "default_maturity_age")]
    pub maturity_age: u32,
    #[serde(default = "default_maturation_window")]
    pub maturation_window: Range<u32>,
    #[serde(default = "default_senescence_window")]
    pub senescence_window: Range<u32>,
    #[serde(default = "default_founder_ages")]
    pub founder_ages: Range<u32>,
}

impl Default for TreeTraits {
    fn default() -> Self {
        Self {
            bloom_min: default_bloom_min(),
            bloom_max: default_bloom_max(),
            flower_min: default_flower_min(),
            flower_max: default_flower_max(),
            pollination_rate: default_pollination_rate(),
            seeds_per_flower: default_seeds_per_flower(),
            maturity_age: default_maturity_age(),
            maturation_window: default_maturation_window(),
            senescence_window: default_senescence_window(),
            founder_ages: default_founder_ages(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoshuaTree {
    age: u32,
    is_mature: bool,
    is_dead: bool,
    seeds: f64,
}

impl JoshuaTree {
    pub fn new(age: u32, traits: &TreeTraits) -> Self {
        Self {
            age,
            is_mature: age >= traits.maturity_age,
            is_dead: false,
            seeds: 0.0,
        }
    }

    /// A tree present at the start of a trial.
    pub fn founder<R: Rng + ?Sized>(rng: &mut R, traits: &TreeTraits) -> Self {
        let age = rng.gen_range(traits.founder_ages.clone());
        Self::new(age, traits)
    }

    pub fn seedling(traits: &TreeTraits) -> Self {
        Self::new(0, traits)
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_mature(&self) -> bool {
        self.is_mature
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn seeds(&self) -> f64 {
        self.seeds
    }

    pub fn with_seeds(mut self, seeds: f64) -> Self {
        self.seeds = seeds.max(0.0);
        self
    }

    pub fn grow_older(&mut self) {
        self.age += 1;
    }

    /// Maturity becomes likelier across the window and certain past its end.
    pub fn check_maturation<R: Rng + ?Sized>(&mut self, rng: &mut R, traits: &TreeTraits) {
        if rng.gen_range(traits.maturation_window.clone()) <= self.age {
            self.is_mature = true;
        }
    }

    /// Background mortality eased by wet years, plus old-age death inside
    /// the senescence window. Returns whether the tree died.
    pub fn check_mortality<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        weather: &WeatherSample,
        stats: &RainfallStatistics,
        demography: &DemographyConfig,
        traits: &TreeTraits,
    ) -> bool {
        let death_prob = demography.tree_death_rate - stats.anomaly(weather.rainfall) / 1000.0;
        if rng.chance(death_prob) || rng.gen_range(traits.senescence_window.clone()) <= self.age {
            self.is_dead = true;
        }
        self.is_dead
    }

    /// Seed stock after this year's weather-driven attrition.
    ///
    /// Only a working value: the stored stock is left untouched, and a bloom
    /// later in the year replaces the working value with the new stock.
    pub fn seeds_after_attrition(
        &self,
        weather: &WeatherSample,
        stats: &RainfallStatistics,
        demography: &DemographyConfig,
    ) -> f64 {
        let anomaly = stats.anomaly(weather.rainfall) / 100.0;
        let factor = match weather.rain {
            RainCategory::Wet => demography.seed_death_rate - anomaly,
            RainCategory::Dry => demography.seed_death_rate + anomaly,
            RainCategory::Normal => demography.seed_death_rate,
        };
        self.seeds * factor
    }

    /// Single draw against the (possibly stress-boosted) bloom probability.
    pub fn should_bloom<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        weather: &WeatherSample,
        demography: &DemographyConfig,
    ) -> bool {
        let probability = if weather.is_stressed() {
            demography.bloom_probability + demography.stress_bloom
        } else {
            demography.bloom_probability
        };
        rng.chance(probability)
    }

    /// Adds the seeds of a flowering season to the stock and returns the new
    /// stock.
    pub fn bloom<R: Rng + ?Sized>(&mut self, rng: &mut R, traits: &TreeTraits) -> f64 {
        let events = rng.gen_range(traits.bloom_min..traits.bloom_max);
        for _ in 0..events {
            let flowers = rng.gen_range(traits.flower_min..traits.flower_max);
            self.seeds += flowers as f64 * traits.pollination_rate * traits.seeds_per_flower;
        }
        self.seeds
    }

    /// Moves a rainfall-dependent fraction of the seed stock out as new
    /// seedlings and returns the signed count.
    ///
    /// In years dry enough to push the rate below zero the count is negative
    /// and the stock grows by that amount. The stock is floored at zero.
    pub fn germinate(
        &mut self,
        weather: &WeatherSample,
        stats: &RainfallStatistics,
        demography: &DemographyConfig,
    ) -> i64 {
        let rate = demography.germination_rate + stats.anomaly(weather.rainfall) / 1000.0;
        let germinated = (self.seeds * rate).floor();
        self.seeds = (self.seeds - germinated).max(0.0);
        germinated as i64
    }

    #[cfg(test)]
    pub(crate) fn kill(&mut self) {
        self.is_dead = true;
    }
}
