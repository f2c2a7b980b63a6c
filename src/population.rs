use rand::Rng;

use crate::config::DemographyConfig;
use crate::rainfall::RainfallStatistics;
use crate::tree::{JoshuaTree, TreeTraits};
use crate::weather::WeatherSample;

/// Result of advancing a population by one year.
#[derive(Debug, Clone)]
pub struct YearOutcome {
    /// Survivors in their original order, followed by this year's seedlings.
    pub population: Vec<JoshuaTree>,
    pub deaths: usize,
    /// Seedlings added this year: the net germination total, or zero when
    /// that total is negative.
    pub germinated: u64,
    /// Signed sum of every tree's germination count.
    pub net_germination: i64,
    /// Sum over survivors of the post-attrition working seed stock (the
    /// post-bloom stock for trees that flowered).
    pub seed_bank_after_attrition: f64,
}

/// Applies one year of weather to every tree in a population.
#[derive(Debug, Clone)]
pub struct YearUpdater {
    stats: RainfallStatistics,
    demography: DemographyConfig,
    traits: TreeTraits,
}

impl YearUpdater {
    pub fn new(stats: RainfallStatistics, demography: DemographyConfig, traits: TreeTraits) -> Self {
        Self {
            stats,
            demography,
            traits,
        }
    }

    pub fn traits(&self) -> &TreeTraits {
        &self.traits
    }

    /// Takes the population by value and builds the surviving set as a new
    /// collection, so a removal can never shift or skip its neighbour.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        population: Vec<JoshuaTree>,
        weather: &WeatherSample,
        rng: &mut R,
    ) -> YearOutcome {
        let mut survivors = Vec::with_capacity(population.len());
        let mut deaths = 0;
        let mut net_germination = 0_i64;
        let mut seed_bank_after_attrition = 0.0;

        for mut tree in population {
            if tree.is_dead() {
                deaths += 1;
                continue;
            }

            tree.grow_older();
            tree.check_maturation(rng, &self.traits);
            if tree.check_mortality(rng, weather, &self.stats, &self.demography, &self.traits) {
                deaths += 1;
                continue;
            }

            let mut working_seeds = tree.seeds_after_attrition(weather, &self.stats, &self.demography);
            if tree.is_mature() {
                if tree.should_bloom(rng, weather, &self.demography) {
                    working_seeds = tree.bloom(rng, &self.traits);
                }
                net_germination += tree.germinate(weather, &self.stats, &self.demography);
            }
            seed_bank_after_attrition += working_seeds;
            survivors.push(tree);
        }

        let germinated = net_germination.max(0) as u64;
        survivors.extend((0..germinated).map(|_| JoshuaTree::seedling(&self.traits)));

        YearOutcome {
            population: survivors,
            deaths,
            germinated,
            net_germination,
            seed_bank_after_attrition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{RainCategory, TempCategory};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stats() -> RainfallStatistics {
        RainfallStatistics {
            mean: 14.0,
            stdev: 6.0,
        }
    }

    fn normal_year() -> WeatherSample {
        WeatherSample {
            rain: RainCategory::Normal,
            temperature: TempCategory::Warm,
            rainfall: 14.0,
        }
    }

    fn quiet_demography() -> DemographyConfig {
        DemographyConfig {
            tree_death_rate: 0.0,
            bloom_probability: 0.0,
            stress_bloom: 0.0,
            ..DemographyConfig::default()
        }
    }

    #[test]
    fn test_pre_marked_dead_trees_are_removed_without_skipping() {
        let traits = TreeTraits::default();
        let updater = YearUpdater::new(stats(), quiet_demography(), traits.clone());
        let population: Vec<JoshuaTree> = (0..10)
            .map(|i| {
                let mut tree = JoshuaTree::new(i, &traits);
                if i % 2 == 0 {
                    tree.kill();
                }
                tree
            })
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = updater.advance(population, &normal_year(), &mut rng);

        assert_eq!(outcome.deaths, 5);
        let ages: Vec<u32> = outcome.population.iter().map(|t| t.age()).collect();
        assert_eq!(ages, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_survivors_age_and_keep_order() {
        let traits = TreeTraits::default();
        let updater = YearUpdater::new(stats(), quiet_demography(), traits.clone());
        let population = vec![
            JoshuaTree::new(3, &traits),
            JoshuaTree::new(70, &traits),
            JoshuaTree::new(0, &traits),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let outcome = updater.advance(population, &normal_year(), &mut rng);

        assert_eq!(outcome.deaths, 0);
        assert_eq!(outcome.germinated, 0);
        let ages: Vec<u32> = outcome.population.iter().map(|t| t.age()).collect();
        assert_eq!(ages, vec![4, 71, 1]);
    }

    #[test]
    fn test_germinated_seeds_become_seedlings() {
        let traits = TreeTraits::default();
        let demography = DemographyConfig {
            germination_rate: 0.01,
            ..quiet_demography()
        };
        let updater = YearUpdater::new(stats(), demography, traits.clone());
        let population = vec![JoshuaTree::new(80, &traits).with_seeds(500.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let outcome = updater.advance(population, &normal_year(), &mut rng);

        assert_eq!(outcome.germinated, 5);
        assert_eq!(outcome.population.len(), 6);
        assert_eq!(outcome.population[0].age(), 81);
        assert!((outcome.population[0].seeds() - 495.0).abs() < 1e-9);
        assert!(outcome.population[1..]
            .iter()
            .all(|t| t.age() == 0 && !t.is_mature()));
        // Attrition is reported but never stored.
        assert!((outcome.seed_bank_after_attrition - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_dry_year_grows_seed_stock_without_seedlings() {
        let traits = TreeTraits::default();
        // Keeps background mortality below zero despite the dry year.
        let demography = DemographyConfig {
            tree_death_rate: -1.0,
            ..quiet_demography()
        };
        let updater = YearUpdater::new(stats(), demography, traits.clone());
        let population = vec![
            JoshuaTree::new(80, &traits).with_seeds(500.0),
            JoshuaTree::new(90, &traits).with_seeds(500.0),
        ];
        // Rate 0.001 - 5.5 / 1000 = -0.0045: each tree germinates -3.
        let dry = WeatherSample {
            rain: RainCategory::Normal,
            temperature: TempCategory::Warm,
            rainfall: 8.5,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let outcome = updater.advance(population, &dry, &mut rng);

        assert_eq!(outcome.deaths, 0);
        assert_eq!(outcome.net_germination, -6);
        assert_eq!(outcome.germinated, 0);
        assert_eq!(outcome.population.len(), 2);
        for tree in &outcome.population {
            assert!((tree.seeds() - 503.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_immature_trees_do_not_germinate() {
        let traits = TreeTraits::default();
        let demography = DemographyConfig {
            germination_rate: 1.0,
            ..quiet_demography()
        };
        let updater = YearUpdater::new(stats(), demography, traits.clone());
        let population = vec![JoshuaTree::new(10, &traits).with_seeds(100.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let outcome = updater.advance(population, &normal_year(), &mut rng);

        assert_eq!(outcome.germinated, 0);
        assert_eq!(outcome.population[0].seeds(), 100.0);
    }

    #[test]
    fn test_bloom_replaces_working_seed_value() {
        let traits = TreeTraits::default();
        let demography = DemographyConfig {
            bloom_probability: 1.0,
            germination_rate: 0.0,
            ..quiet_demography()
        };
        let updater = YearUpdater::new(stats(), demography, traits.clone());
        let population = vec![JoshuaTree::new(60, &traits).with_seeds(100.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let outcome = updater.advance(population, &normal_year(), &mut rng);

        let tree = &outcome.population[0];
        assert!(tree.seeds() > 100.0);
        assert_eq!(outcome.seed_bank_after_attrition, tree.seeds());
    }

    proptest! {
        #[test]
        fn population_accounting_holds(
            seed in any::<u64>(),
            ages in proptest::collection::vec(0u32..520, 0..40),
            rainfall in -10.0f64..40.0,
        ) {
            let traits = TreeTraits::default();
            let demography = DemographyConfig {
                germination_rate: 0.05,
                bloom_probability: 0.5,
                ..DemographyConfig::default()
            };
            let updater = YearUpdater::new(stats(), demography, traits.clone());
            let weather = WeatherSample {
                rain: crate::weather::classify_rain(rainfall, &stats()),
                temperature: TempCategory::Cold,
                rainfall,
            };
            let population: Vec<JoshuaTree> =
                ages.iter().map(|&age| JoshuaTree::new(age, &traits).with_seeds(50.0)).collect();
            let before: Vec<(u32, bool)> =
                population.iter().map(|t| (t.age(), t.is_mature())).collect();
            let size_before = population.len();

            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = updater.advance(population, &weather, &mut rng);

            prop_assert_eq!(
                outcome.population.len(),
                size_before - outcome.deaths + outcome.germinated as usize
            );
            prop_assert!(outcome.population.iter().all(|t| t.seeds() >= 0.0 && !t.is_dead()));

            let survivors = outcome.population.len() - outcome.germinated as usize;
            for tree in &outcome.population[..survivors] {
                prop_assert!(before
                    .iter()
                    .any(|&(age, mature)| tree.age() == age + 1 && (tree.is_mature() || !mature)));
            }
        }
    }
}
