use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rainfall::RainfallStatistics;
use crate::rng::RngExt;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid rainfall distribution (mean {mean}, stdev {stdev})")]
    InvalidDistribution { mean: f64, stdev: f64 },

    #[error("cold year probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RainCategory {
    Wet,
    Normal,
    Dry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TempCategory {
    Cold,
    Warm,
}

/// One simulated year of weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub rain: RainCategory,
    pub temperature: TempCategory,
    pub rainfall: f64,
}

impl WeatherSample {
    /// Dry or cold years push trees towards stress flowering.
    pub fn is_stressed(&self) -> bool {
        self.rain == RainCategory::Dry || self.temperature == TempCategory::Cold
    }
}

/// Wet above one stdev over the mean, dry below one stdev under it.
pub fn classify_rain(rainfall: f64, stats: &RainfallStatistics) -> RainCategory {
    if rainfall > stats.mean + stats.stdev {
        RainCategory::Wet
    } else if rainfall < stats.mean - stats.stdev {
        RainCategory::Dry
    } else {
        RainCategory::Normal
    }
}

#[derive(Debug, Clone)]
pub struct WeatherSampler {
    stats: RainfallStatistics,
    rainfall: Normal<f64>,
    cold_year_prob: f64,
}

impl WeatherSampler {
    pub fn new(stats: RainfallStatistics, cold_year_prob: f64) -> Result<Self, WeatherError> {
        if !(0.0..=1.0).contains(&cold_year_prob) {
            return Err(WeatherError::InvalidProbability(cold_year_prob));
        }
        let rainfall =
            Normal::new(stats.mean, stats.stdev).map_err(|_| WeatherError::InvalidDistribution {
                mean: stats.mean,
                stdev: stats.stdev,
            })?;
        Ok(Self {
            stats,
            rainfall,
            cold_year_prob,
        })
    }

    pub fn sample_year<R: Rng + ?Sized>(&self, rng: &mut R) -> WeatherSample {
        let rainfall = self.rainfall.sample(rng);
        let rain = classify_rain(rainfall, &self.stats);
        let temperature = if rng.chance(self.cold_year_prob) {
            TempCategory::Cold
        } else {
            TempCategory::Warm
        };
        WeatherSample {
            rain,
            temperature,
            rainfall,
        }
    }
}
