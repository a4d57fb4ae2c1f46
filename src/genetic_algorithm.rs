use crate::error::Result;
use rand::RngCore;
use std::fmt::Debug;

// This trait represents a chromosome - a single candidate
// solution to the problem we're solving
pub trait Chromosome: Send + Sync + Debug + Clone {
    fn fitness(&self) -> i64;
}

// This trait represents a configuration of the algorithm
pub trait Meta: Send + Sync + Debug + Clone {
    fn population_size(&self) -> usize;
    fn mutation_rate(&self) -> f64;
}

// This trait represents the stopping condition of the algorithm
// and observes every completed generation
pub trait Evaluator<C: Chromosome>: Debug {
    fn record(&mut self, _chromosomes: &[C], _generation: usize) {}
    fn can_terminate(&mut self, chromosomes: &[C], generation: usize) -> bool;
}

// This trait encapsulates the optimizer logic
pub trait Optimizer<C: Chromosome>: Debug {
    fn optimize(&mut self, eval: &mut dyn Evaluator<C>, rng: &mut dyn RngCore) -> Result<Vec<C>>;
}

// This trait encapsulates the underlying genetic algorithm
// used by the optimizer to find the solution
pub trait Algorithm<M: Meta, C: Chromosome>: Debug {
    fn meta(&self) -> &M;
    fn generate(&self, rng: &mut dyn RngCore) -> Vec<C>;
    fn evaluate(&self, population: Vec<C>) -> Vec<C>;
    fn select(&self, chromosomes: &[C]) -> Result<Vec<C>>;
    fn crossover(&self, parents: &[C], rng: &mut dyn RngCore) -> Vec<C>;
    fn mutate(&self, population: Vec<C>, rng: &mut dyn RngCore) -> Vec<C>;
    fn replenish(&self, children: Vec<C>, parents: &[C], rng: &mut dyn RngCore) -> Vec<C>;
}
