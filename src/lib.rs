pub mod config;
pub mod engine;
pub mod population;
pub mod rainfall;
pub mod report;
pub mod rng;
pub mod tree;
pub mod weather;

pub use config::SimulationConfig;
pub use engine::{ExperimentRunner, TrialRunner, YearSummary};
pub use population::{YearOutcome, YearUpdater};
pub use rainfall::RainfallStatistics;
pub use rng::RngManager;
pub use tree::{JoshuaTree, TreeTraits};
pub use weather::{WeatherSample, WeatherSampler};
