//! Summaries of an experiment's final-size distribution.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::rainfall::RainfallStatistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub trials: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub stdev: f64,
    /// Trials that ended with no trees.
    pub extinctions: usize,
}

impl Distribution {
    pub fn from_sizes(sizes: &[usize]) -> Option<Self> {
        let min = *sizes.iter().min()?;
        let max = *sizes.iter().max()?;
        let n = sizes.len() as f64;
        let mean = sizes.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = sizes
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(Self {
            trials: sizes.len(),
            min,
            max,
            mean,
            stdev: variance.sqrt(),
            extinctions: sizes.iter().filter(|&&s| s == 0).count(),
        })
    }
}

/// Inclusive integer range `[start, end]` and how many trials fell in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: usize,
    pub end: usize,
    pub count: usize,
}

/// Equal-width integer bins spanning min..=max. Never more bins than
/// distinct values in that span.
pub fn histogram(sizes: &[usize], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sizes.iter().min(), sizes.iter().max()) else {
        return Vec::new();
    };
    let span = max - min + 1;
    let bins = bins.clamp(1, span);
    let width = span.div_ceil(bins);

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + i * width,
            end: (min + (i + 1) * width - 1).min(max),
            count: 0,
        })
        .filter(|bin| bin.start <= max)
        .collect();
    for &size in sizes {
        let index = ((size - min) / width).min(result.len() - 1);
        result[index].count += 1;
    }
    result
}

pub fn render_histogram(bins: &[HistogramBin], bar_width: usize) -> String {
    let peak = bins.iter().map(|bin| bin.count).max().unwrap_or(0);
    let mut out = String::new();
    for bin in bins {
        let bar_len = if peak == 0 {
            0
        } else {
            bin.count * bar_width / peak
        };
        let _ = writeln!(
            out,
            "  {:>6}-{:<6} {} ({})",
            bin.start,
            bin.end,
            "█".repeat(bar_len),
            bin.count
        );
    }
    out
}

/// Everything printed at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub scenario: String,
    pub seed: u64,
    pub years: u32,
    pub mature_trees: usize,
    pub rainfall: RainfallStatistics,
    pub final_sizes: Vec<usize>,
    pub distribution: Option<Distribution>,
    pub histogram: Vec<HistogramBin>,
}

impl ExperimentResult {
    pub fn new(
        scenario: impl Into<String>,
        seed: u64,
        years: u32,
        mature_trees: usize,
        rainfall: RainfallStatistics,
        final_sizes: Vec<usize>,
        bins: usize,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            seed,
            years,
            mature_trees,
            rainfall,
            distribution: Distribution::from_sizes(&final_sizes),
            histogram: histogram(&final_sizes, bins),
            final_sizes,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scenario '{}' (seed {}): {} trials of {} years from {} mature trees",
            self.scenario,
            self.seed,
            self.final_sizes.len(),
            self.years,
            self.mature_trees
        );
        let _ = writeln!(
            out,
            "Rainfall mean {:.2}, stdev {:.2}",
            self.rainfall.mean, self.rainfall.stdev
        );
        let _ = writeln!(out, "Final sizes: {:?}", self.final_sizes);
        if let Some(dist) = &self.distribution {
            let _ = writeln!(
                out,
                "min {}  max {}  mean {:.2}  stdev {:.2}  extinct {}",
                dist.min, dist.max, dist.mean, dist.stdev, dist.extinctions
            );
        }
        out.push_str(&render_histogram(&self.histogram, 40));
        out
    }
}
