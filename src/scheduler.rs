use crate::error::{Result, SchedulerError};
use crate::fitness::{self, FitnessReport};
use crate::genetic_algorithm::Optimizer;
use crate::genetic_optimizer::{
    FitnessHistory, GenerationBudget, GeneticOptimizer, TimetableAlgorithm, TimetableConfig,
};
use crate::grid::TimetableGrid;
use crate::records::{load_records_from_path, ClassRecord, MIN_RECORDS};
use crate::timetable::Timetable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;

/// Runs the whole pipeline: records in, decoded grid out.
///
/// ```no_run
/// use genetic_timetable::{TimetableConfig, TimetableScheduler};
///
/// let mut scheduler = TimetableScheduler::new(TimetableConfig {
///     seed: Some(7),
///     ..Default::default()
/// });
/// let grid = scheduler.run("input_data.txt")?;
/// println!("{}", grid);
/// println!("{} generations", scheduler.fitness_history().len());
/// # Ok::<(), genetic_timetable::SchedulerError>(())
/// ```
#[derive(Debug)]
pub struct TimetableScheduler {
    config: TimetableConfig,
    history: FitnessHistory,
    best: Option<Timetable>,
}

impl TimetableScheduler {
    pub fn new(config: TimetableConfig) -> Self {
        Self {
            config,
            history: FitnessHistory::new(),
            best: None,
        }
    }

    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    pub fn run(&mut self, input: impl AsRef<Path>) -> Result<TimetableGrid> {
        self.reset();
        let records = load_records_from_path(input)?;
        self.run_records(records)
    }

    /// A failed run leaves no history and no best timetable behind.
    pub fn run_records(&mut self, records: Vec<ClassRecord>) -> Result<TimetableGrid> {
        self.reset();
        self.config.validate()?;
        if records.len() < MIN_RECORDS {
            return Err(SchedulerError::InsufficientData {
                found: records.len(),
            });
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut optimizer = GeneticOptimizer {
            algorithm: Box::new(TimetableAlgorithm::new(self.config.clone(), records)),
        };
        let mut budget = GenerationBudget::new(self.config.generations);

        let population = optimizer.optimize(&mut budget, &mut rng)?;
        let best = population
            .into_iter()
            .next()
            .ok_or(SchedulerError::InsufficientCandidates { found: 0 })?;

        info!(
            generations = budget.history.len(),
            fitness = best.fitness,
            entries = best.len(),
            "Evolution finished"
        );

        let grid = TimetableGrid::decode(&best);
        self.history = budget.history;
        self.best = Some(best);

        Ok(grid)
    }

    fn reset(&mut self) {
        self.history.clear();
        self.best = None;
    }

    /// Best score of every completed generation of the last run.
    pub fn fitness_history(&self) -> &FitnessHistory {
        &self.history
    }

    pub fn best(&self) -> Option<&Timetable> {
        self.best.as_ref()
    }

    pub fn best_report(&self) -> Option<FitnessReport> {
        self.best.as_ref().map(|best| fitness::report(&best.entries))
    }
}
