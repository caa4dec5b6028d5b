pub mod crossover;
pub mod initialization;
pub mod population;
pub mod runner;

pub use self::population::Population;
pub use self::runner::{
    best_trial, run_trials, ImproveStats, OptimizationOptions, Optimizer, ProgressCallback,
    SearchOutcome, SearchPhase, Silent, TrialOutcome,
};
