use std::path::PathBuf;

use yucca::{
    config::ConfigError,
    rainfall::{load_rainfall, RainfallError, RainfallStatistics},
    SimulationConfig,
};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
}

#[test]
fn scenario_loader_reads_fixture() {
    let config =
        SimulationConfig::load_from_path(fixture("scenarios/mojave.yaml")).expect("scenario parses");
    assert_eq!(config.name, "mojave_baseline");
    assert_eq!(config.seed, 7);
    assert_eq!(config.experiment.trials, 10);
    assert_eq!(config.experiment.mature_trees, 20);
    assert_eq!(config.experiment.years, 100);
    assert!(config.rainfall_csv.ends_with("la_rainfall.csv"));
    assert!(config.rainfall_csv.exists());
}

#[test]
fn partial_scenario_falls_back_to_defaults() {
    let config = SimulationConfig::load_from_path(fixture("scenarios/short_drought.yaml")).unwrap();
    assert_eq!(config.demography.tree_death_rate, 0.02);
    assert_eq!(config.demography.germination_rate, 0.001);
    assert_eq!(config.tree.flower_min, 24);
}

#[test]
fn rainfall_fixture_skips_header_and_missing_rows() {
    let observations = load_rainfall(fixture("data/la_rainfall.csv")).unwrap();
    assert_eq!(observations.len(), 41);
    assert_eq!(observations.first().copied(), Some(11.99));

    let stats = RainfallStatistics::from_observations(&observations).unwrap();
    assert!(stats.mean > 10.0 && stats.mean < 20.0);
    assert!(stats.stdev > 0.0);
}

#[test]
fn rainfall_file_without_numbers_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rain.csv");
    std::fs::write(&path, "Rainfall\nnone\n\n").unwrap();

    let observations = load_rainfall(&path).unwrap();
    assert!(observations.is_empty());
    assert!(matches!(
        RainfallStatistics::from_observations(&observations),
        Err(RainfallError::Empty)
    ));
}

#[test]
fn invalid_scenario_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "name: bad\ntree:\n  flower_min: 50\n  flower_max: 40\n").unwrap();

    assert!(matches!(
        SimulationConfig::load_from_path(&path),
        Err(ConfigError::Validation(_))
    ));
}
