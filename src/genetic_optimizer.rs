use crate::error::{Result, SchedulerError};
use crate::fitness;
use crate::genetic_algorithm::{Algorithm, Chromosome, Evaluator, Meta, Optimizer};
use crate::records::ClassRecord;
use crate::timetable::{initialize_population, Timetable, SLOTS_PER_SESSION};
use rand::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::debug;

/// How the mutation rate is applied to a child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MutationMode {
    /// One coin flip per child; on success every slot is redrawn.
    #[default]
    PerIndividual,
    /// One coin flip per entry.
    PerGene,
}

#[derive(Clone, Debug)]
pub struct TimetableConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub mutation_mode: MutationMode,
    pub seed: Option<u64>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 100,
            mutation_rate: 0.1,
            mutation_mode: MutationMode::PerIndividual,
            seed: None,
        }
    }
}

impl TimetableConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SchedulerError::InvalidConfig(format!(
                "mutation rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }

        Ok(())
    }
}

impl Meta for TimetableConfig {
    fn population_size(&self) -> usize {
        self.population_size
    }

    fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }
}

#[derive(Debug)]
pub struct TimetableAlgorithm {
    pub config: TimetableConfig,
    pub records: Vec<Arc<ClassRecord>>,
}

impl TimetableAlgorithm {
    pub fn new(config: TimetableConfig, records: Vec<ClassRecord>) -> Self {
        Self {
            config,
            records: records.into_iter().map(Arc::new).collect(),
        }
    }
}

impl Algorithm<TimetableConfig, Timetable> for TimetableAlgorithm {
    fn meta(&self) -> &TimetableConfig {
        &self.config
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec<Timetable> {
        initialize_population(&self.records, self.config.population_size, rng)
    }

    /// Scores every timetable and ranks them best first. The sort is stable,
    /// so ties keep their population order.
    fn evaluate(&self, mut population: Vec<Timetable>) -> Vec<Timetable> {
        population
            .iter_mut()
            .for_each(|timetable| timetable.fitness = fitness::score(&timetable.entries));
        population.sort_by_key(|timetable| Reverse(timetable.fitness));

        population
    }

    /// Keeps the better half of an already ranked population.
    fn select(&self, chromosomes: &[Timetable]) -> Result<Vec<Timetable>> {
        if chromosomes.len() < 2 {
            return Err(SchedulerError::InsufficientCandidates {
                found: chromosomes.len(),
            });
        }

        Ok(chromosomes[..chromosomes.len() / 2].to_vec())
    }

    fn crossover(&self, parents: &[Timetable], rng: &mut dyn RngCore) -> Vec<Timetable> {
        parents
            .chunks_exact(2)
            .map(|pair| perform_single_point_crossover(&pair[0], &pair[1], rng))
            .collect()
    }

    fn mutate(&self, mut population: Vec<Timetable>, rng: &mut dyn RngCore) -> Vec<Timetable> {
        for chromosome in population.iter_mut() {
            match self.config.mutation_mode {
                MutationMode::PerIndividual => {
                    if rng.gen_bool(self.config.mutation_rate) {
                        chromosome.entries = chromosome
                            .entries
                            .iter()
                            .map(|entry| entry.with_slot(rng.gen_range(1..=SLOTS_PER_SESSION)))
                            .collect();
                    }
                }
                MutationMode::PerGene => {
                    chromosome.entries = chromosome
                        .entries
                        .iter()
                        .map(|entry| {
                            if rng.gen_bool(self.config.mutation_rate) {
                                entry.with_slot(rng.gen_range(1..=SLOTS_PER_SESSION))
                            } else {
                                entry.clone()
                            }
                        })
                        .collect();
                }
            }
        }

        population
    }

    /// Tops the children up to the population size by drawing parents
    /// uniformly, with replacement.
    fn replenish(
        &self,
        mut children: Vec<Timetable>,
        parents: &[Timetable],
        rng: &mut dyn RngCore,
    ) -> Vec<Timetable> {
        while children.len() < self.config.population_size {
            match parents.choose(rng) {
                Some(parent) => children.push(parent.clone()),
                None => break,
            }
        }

        children
    }
}

/// Child = prefix of `parent_1` + suffix of `parent_2`, cut at the same
/// position. The cut is drawn in `1..min_len` so it is valid for both
/// parents even when their lengths differ; the child then has `parent_2`'s
/// length.
fn perform_single_point_crossover(
    parent_1: &Timetable,
    parent_2: &Timetable,
    rng: &mut dyn RngCore,
) -> Timetable {
    let min_len = parent_1.len().min(parent_2.len());
    if min_len < 2 {
        return Timetable::new(parent_1.entries.clone());
    }

    let crossover_point = rng.gen_range(1..min_len);

    let mut genes = Vec::with_capacity(parent_2.len());
    genes.extend_from_slice(&parent_1.entries[..crossover_point]);
    genes.extend_from_slice(&parent_2.entries[crossover_point..]);

    Timetable::new(genes)
}

#[derive(Debug)]
pub struct GeneticOptimizer {
    pub algorithm: Box<dyn Algorithm<TimetableConfig, Timetable>>,
}

impl Optimizer<Timetable> for GeneticOptimizer {
    fn optimize(
        &mut self,
        eval: &mut dyn Evaluator<Timetable>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Timetable>> {
        let meta = self.algorithm.meta();
        debug!(
            population_size = meta.population_size(),
            mutation_rate = meta.mutation_rate(),
            "Starting evolution"
        );

        let mut generation = 0;
        let mut population = self.algorithm.evaluate(self.algorithm.generate(rng));

        while !eval.can_terminate(&population, generation) {
            let selected = self.algorithm.select(&population)?;
            let children = self.algorithm.crossover(&selected, rng);
            let mutated_children = self.algorithm.mutate(children, rng);

            population = self
                .algorithm
                .evaluate(self.algorithm.replenish(mutated_children, &selected, rng));

            eval.record(&population, generation);
            generation += 1;
        }

        Ok(population)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FitnessPoint {
    pub generation: usize,
    pub best: i64,
}

pub type FitnessHistory = Vec<FitnessPoint>;

/// Stops after a fixed number of generations and keeps the best score of
/// each one.
#[derive(Debug, Default)]
pub struct GenerationBudget {
    pub generations: usize,
    pub history: FitnessHistory,
}

impl GenerationBudget {
    pub fn new(generations: usize) -> Self {
        Self {
            generations,
            history: Vec::with_capacity(generations),
        }
    }
}

impl<C: Chromosome> Evaluator<C> for GenerationBudget {
    fn record(&mut self, chromosomes: &[C], generation: usize) {
        if let Some(best) = chromosomes.iter().map(|c| c.fitness()).max() {
            debug!(generation, best, population = chromosomes.len(), "Generation complete");
            self.history.push(FitnessPoint { generation, best });
        }
    }

    fn can_terminate(&mut self, _chromosomes: &[C], generation: usize) -> bool {
        generation >= self.generations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{Day, ScheduleEntry, Session};
    use rand::rngs::StdRng;

    fn records(n: usize) -> Vec<ClassRecord> {
        (0..n)
            .map(|i| ClassRecord::new(format!("S{}", i), format!("T{}", i % 4), "10A"))
            .collect()
    }

    fn algorithm(config: TimetableConfig, n: usize) -> TimetableAlgorithm {
        TimetableAlgorithm::new(config, records(n))
    }

    fn scored(fitness: i64, len: usize) -> Timetable {
        let record = Arc::new(ClassRecord::new("S", "T", "C"));
        Timetable {
            entries: (0..len)
                .map(|i| {
                    let slot = (i % 5) as u8 + 1;
                    ScheduleEntry::new(Day::Mon, Session::Morning, slot, Arc::clone(&record)).unwrap()
                })
                .collect(),
            fitness,
        }
    }

    #[test]
    fn test_default_config() {
        let config = TimetableConfig::default();
        assert_eq!(config.population_size, 20);
        assert_eq!(config.generations, 100);
        assert_eq!(config.mutation_rate, 0.1);
        assert_eq!(config.mutation_mode, MutationMode::PerIndividual);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_mutation_rate() {
        let config = TimetableConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_evaluate_ranks_best_first() {
        let algo = algorithm(TimetableConfig::default(), 20);
        let mut rng = StdRng::seed_from_u64(42);
        let population = algo.evaluate(algo.generate(&mut rng));

        assert_eq!(population.len(), 20);
        assert!(population.windows(2).all(|w| w[0].fitness >= w[1].fitness));
        assert!(population
            .iter()
            .all(|t| t.fitness == fitness::score(&t.entries)));
    }

    #[test]
    fn test_select_keeps_top_half() {
        let algo = algorithm(TimetableConfig::default(), 4);
        let population: Vec<Timetable> = [0, -10, -20, -30, -40].iter().map(|&f| scored(f, 4)).collect();

        let selected = algo.select(&population).unwrap();
        assert_eq!(selected.iter().map(|t| t.fitness).collect::<Vec<_>>(), vec![0, -10]);
    }

    #[test]
    fn test_select_two_keeps_one() {
        let algo = algorithm(TimetableConfig::default(), 4);
        let selected = algo.select(&[scored(0, 4), scored(-10, 4)]).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_select_needs_two_candidates() {
        let algo = algorithm(TimetableConfig::default(), 4);

        let err = algo.select(&[scored(0, 4)]).unwrap_err();
        assert!(matches!(err, SchedulerError::InsufficientCandidates { found: 1 }));

        let err = algo.select(&[]).unwrap_err();
        assert!(matches!(err, SchedulerError::InsufficientCandidates { found: 0 }));
    }

    #[test]
    fn test_crossover_pairs_and_drops_odd() {
        let algo = algorithm(TimetableConfig::default(), 4);
        let mut rng = StdRng::seed_from_u64(1);
        let parents: Vec<Timetable> = (0..5).map(|_| scored(0, 10)).collect();

        let children = algo.crossover(&parents, &mut rng);
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.len() == 10));
    }

    #[test]
    fn test_crossover_takes_prefix_and_suffix() {
        let mut rng = StdRng::seed_from_u64(9);
        let p1 = Timetable::random(&algorithm(TimetableConfig::default(), 12).records, &mut rng);
        let p2 = Timetable::random(&algorithm(TimetableConfig::default(), 12).records, &mut rng);

        for _ in 0..20 {
            let child = perform_single_point_crossover(&p1, &p2, &mut rng);
            assert_eq!(child.len(), 12);

            let cut = (0..=child.len())
                .find(|&i| child.entries[..i] != p1.entries[..i])
                .map(|i| i - 1)
                .unwrap_or(child.len());
            assert!(cut >= 1);
            assert_eq!(child.entries[cut..], p2.entries[cut..]);
        }
    }

    #[test]
    fn test_crossover_uneven_parents() {
        let mut rng = StdRng::seed_from_u64(2);
        let short = scored(0, 3);
        let long = scored(0, 9);

        for _ in 0..20 {
            assert_eq!(perform_single_point_crossover(&long, &short, &mut rng).len(), 3);
            assert_eq!(perform_single_point_crossover(&short, &long, &mut rng).len(), 9);
        }
    }

    #[test]
    fn test_crossover_single_entry_copies_first_parent() {
        let mut rng = StdRng::seed_from_u64(2);
        let child = perform_single_point_crossover(&scored(0, 1), &scored(0, 6), &mut rng);
        assert_eq!(child.len(), 1);
    }

    #[test]
    fn test_mutation_rate_one_redraws_whole_individual() {
        let config = TimetableConfig {
            mutation_rate: 1.0,
            ..Default::default()
        };
        let algo = algorithm(config, 30);
        let mut rng = StdRng::seed_from_u64(4);
        let original = algo.generate(&mut rng);

        let mutated = algo.mutate(original.clone(), &mut rng);
        for (before, after) in original.iter().zip(mutated.iter()) {
            assert_eq!(before.len(), after.len());
            assert_ne!(before.entries, after.entries);
            for (b, a) in before.entries.iter().zip(after.entries.iter()) {
                assert_eq!((b.day, b.session, &b.record), (a.day, a.session, &a.record));
                assert!((1..=SLOTS_PER_SESSION).contains(&a.slot()));
            }
        }
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        for mode in [MutationMode::PerIndividual, MutationMode::PerGene] {
            let config = TimetableConfig {
                mutation_rate: 0.0,
                mutation_mode: mode,
                ..Default::default()
            };
            let algo = algorithm(config, 30);
            let mut rng = StdRng::seed_from_u64(4);
            let original = algo.generate(&mut rng);

            assert_eq!(algo.mutate(original.clone(), &mut rng), original);
        }
    }

    #[test]
    fn test_per_gene_mutation_touches_some_entries() {
        let config = TimetableConfig {
            mutation_rate: 0.5,
            mutation_mode: MutationMode::PerGene,
            ..Default::default()
        };
        let algo = algorithm(config, 60);
        let mut rng = StdRng::seed_from_u64(8);
        let original = algo.generate(&mut rng);
        let mutated = algo.mutate(original.clone(), &mut rng);

        let changed = original[0]
            .entries
            .iter()
            .zip(mutated[0].entries.iter())
            .filter(|(b, a)| b.slot() != a.slot())
            .count();
        assert!(changed > 0 && changed < 60);
    }

    #[test]
    fn test_replenish_pads_from_parents() {
        let algo = algorithm(TimetableConfig::default(), 4);
        let mut rng = StdRng::seed_from_u64(3);
        let parents = vec![scored(-1, 4), scored(-2, 4)];

        let population = algo.replenish(vec![scored(-5, 4)], &parents, &mut rng);
        assert_eq!(population.len(), 20);
        assert_eq!(population[0].fitness, -5);
        assert!(population[1..].iter().all(|t| t.fitness == -1 || t.fitness == -2));
    }

    #[test]
    fn test_budget_records_generation_maximum() {
        let mut budget = GenerationBudget::new(3);
        let population = vec![scored(-30, 2), scored(-10, 2), scored(-20, 2)];

        Evaluator::<Timetable>::record(&mut budget, &population, 0);
        Evaluator::<Timetable>::record(&mut budget, &[], 1);

        assert_eq!(budget.history, vec![FitnessPoint { generation: 0, best: -10 }]);
        assert!(!Evaluator::<Timetable>::can_terminate(&mut budget, &population, 2));
        assert!(Evaluator::<Timetable>::can_terminate(&mut budget, &population, 3));
    }

    #[test]
    fn test_optimize_records_every_generation() {
        let config = TimetableConfig {
            population_size: 12,
            generations: 15,
            ..Default::default()
        };
        let mut optimizer = GeneticOptimizer {
            algorithm: Box::new(algorithm(config, 24)),
        };
        let mut budget = GenerationBudget::new(15);
        let mut rng = StdRng::seed_from_u64(21);

        let population = optimizer.optimize(&mut budget, &mut rng).unwrap();

        assert_eq!(population.len(), 12);
        assert_eq!(budget.history.len(), 15);
        assert!(budget
            .history
            .iter()
            .enumerate()
            .all(|(i, point)| point.generation == i));
        assert_eq!(budget.history.last().unwrap().best, population[0].fitness);
    }

    #[test]
    fn test_optimize_population_of_two() {
        let config = TimetableConfig {
            population_size: 2,
            generations: 5,
            ..Default::default()
        };
        let mut optimizer = GeneticOptimizer {
            algorithm: Box::new(algorithm(config, 10)),
        };
        let mut budget = GenerationBudget::new(5);
        let mut rng = StdRng::seed_from_u64(0);

        let population = optimizer.optimize(&mut budget, &mut rng).unwrap();
        assert_eq!(population.len(), 2);
        assert_eq!(budget.history.len(), 5);
    }

    #[test]
    fn test_optimize_population_of_one_fails() {
        let config = TimetableConfig {
            population_size: 1,
            generations: 5,
            ..Default::default()
        };
        let mut optimizer = GeneticOptimizer {
            algorithm: Box::new(algorithm(config, 10)),
        };
        let mut budget = GenerationBudget::new(5);
        let mut rng = StdRng::seed_from_u64(0);

        let err = optimizer.optimize(&mut budget, &mut rng).unwrap_err();
        assert!(matches!(err, SchedulerError::InsufficientCandidates { found: 1 }));
        assert!(budget.history.is_empty());
    }
}
