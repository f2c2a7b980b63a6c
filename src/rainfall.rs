//! Historical rainfall input and its summary statistics.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RainfallError {
    #[error("failed to read rainfall data from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No record in the data source parsed as a rainfall value.
    #[error("rainfall dataset contains no usable observations")]
    Empty,
}

/// Mean and population standard deviation of the historical record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainfallStatistics {
    pub mean: f64,
    pub stdev: f64,
}

impl RainfallStatistics {
    pub fn from_observations(observations: &[f64]) -> Result<Self, RainfallError> {
        if observations.is_empty() {
            return Err(RainfallError::Empty);
        }

        let n = observations.len() as f64;
        let mean = observations.iter().sum::<f64>() / n;
        let variance = observations
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / n;

        Ok(Self {
            mean,
            stdev: variance.sqrt(),
        })
    }

    /// Signed distance of `rainfall` from the historical mean.
    pub fn anomaly(&self, rainfall: f64) -> f64 {
        rainfall - self.mean
    }
}

pub fn load_rainfall(path: impl AsRef<Path>) -> Result<Vec<f64>, RainfallError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RainfallError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let observations = parse_rainfall(&text);
    debug!(
        path = %path.display(),
        observations = observations.len(),
        "loaded rainfall data"
    );
    Ok(observations)
}

/// Takes the first field of every record. Records that do not hold a finite
/// float (headers, blanks, notes) are skipped.
pub fn parse_rainfall(text: &str) -> Vec<f64> {
    let mut observations = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let field = line
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches('"')
            .trim();
        match field.parse::<f64>() {
            Ok(value) if value.is_finite() => observations.push(value),
            _ => warn!(
                line = index + 1,
                record = line,
                "skipping non-numeric rainfall record"
            ),
        }
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_statistics_use_population_stdev() {
        let stats = RainfallStatistics::from_observations(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])
            .unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.stdev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_has_zero_stdev() {
        let stats = RainfallStatistics::from_observations(&[12.5]).unwrap();
        assert_eq!(stats.mean, 12.5);
        assert_eq!(stats.stdev, 0.0);
    }

    #[test]
    fn test_empty_observations_rejected() {
        let err = RainfallStatistics::from_observations(&[]).unwrap_err();
        assert!(matches!(err, RainfallError::Empty));
    }

    #[test]
    fn test_parse_skips_malformed_records() {
        let text = "Rainfall,Season\n14.2,1950-51\n\"8.5\",1951-52\nn/a,1952-53\n\n  20.1 ,1953-54\nNaN\n";
        assert_eq!(parse_rainfall(text), vec![14.2, 8.5, 20.1]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "inches").unwrap();
        writeln!(file, "10.0").unwrap();
        writeln!(file, "20.0").unwrap();

        let observations = load_rainfall(file.path()).unwrap();
        assert_eq!(observations, vec![10.0, 20.0]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rainfall(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, RainfallError::Io { .. }));
    }
}
