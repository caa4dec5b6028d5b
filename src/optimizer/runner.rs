use super::crossover::{crossover_one_point, draw_crossover_point, pick_parent_index};
use super::initialization::random_configuration;
use super::population::Population;
use crate::config::{BaselinePolicy, Config};
use crate::core_types::{Candidate, Offset, Score};
use crate::demand::DemandSchedule;
use crate::error::{TuneError, TuneResult};
use crate::oracle::Oracle;
use rayon::prelude::*;
use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub population_size: usize,
    pub iterations: usize,
    pub max_wait: Offset,
    pub baseline: BaselinePolicy,
    pub seed: Option<u64>,
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            population_size: cfg.search.population_size,
            iterations: cfg.search.iterations,
            max_wait: cfg.search.max_wait,
            baseline: cfg.search.baseline,
            seed: cfg.search.seed,
        }
    }
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Seeding,
    Improving,
}

/// Receives one notification per oracle evaluation.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, phase: SearchPhase, step: usize, total: usize, worst: Score);
}

pub struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _phase: SearchPhase, _step: usize, _total: usize, _worst: Score) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImproveStats {
    pub iterations: usize,
    pub accepted: usize,
    pub rejected_not_better: usize,
    pub rejected_duplicate: usize,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub population: Population,
    pub stats: ImproveStats,
    pub evaluations: usize,
}

impl SearchOutcome {
    pub fn best(&self) -> Option<&Candidate> {
        self.population.best()
    }
}

pub struct Optimizer {
    options: OptimizationOptions,
    rng: fastrand::Rng,
}

impl Optimizer {
    pub fn new(options: OptimizationOptions) -> Self {
        let rng = if let Some(s) = options.seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };
        Self { options, rng }
    }

    /// Random sampling phase: exactly `population_size` oracle calls.
    pub fn seed_population<O, CB>(
        &mut self,
        oracle: &mut O,
        demand: &DemandSchedule,
        callback: &CB,
    ) -> TuneResult<Population>
    where
        O: Oracle + ?Sized,
        CB: ProgressCallback + ?Sized,
    {
        let opts = &self.options;
        if opts.population_size == 0 {
            return Err(TuneError::Config("population size must be positive".to_string()));
        }
        if opts.max_wait == 0 {
            return Err(TuneError::Config("max wait must be positive".to_string()));
        }

        let dims = oracle.dimensions();
        let total = opts.population_size + opts.iterations;
        let mut population = Population::with_capacity(opts.population_size);

        info!(
            "🌱 Seeding {} candidates ({} offsets each, range [0, {}))",
            opts.population_size, dims, opts.max_wait
        );

        for i in 0..opts.population_size {
            let configuration = random_configuration(&mut self.rng, dims, opts.max_wait);
            let score = oracle.evaluate(&configuration, demand)?;
            debug!("   seed {:>3}: {} -> {:.3}", i, configuration, score);
            population.push(Candidate::new(configuration, score))?;
            callback.on_progress(SearchPhase::Seeding, i + 1, total, population.worst_score());
        }

        population.finish_seeding(opts.baseline)?;
        debug!(
            "   baseline ({}): slot {} at {:.3}",
            opts.baseline,
            population.worst_index(),
            population.worst_score()
        );
        Ok(population)
    }

    /// Crossover and worst-replacement phase: exactly `iterations` oracle calls.
    pub fn improve<O, CB>(
        &mut self,
        population: &mut Population,
        oracle: &mut O,
        demand: &DemandSchedule,
        callback: &CB,
    ) -> TuneResult<ImproveStats>
    where
        O: Oracle + ?Sized,
        CB: ProgressCallback + ?Sized,
    {
        if population.is_empty() {
            return Err(TuneError::Invariant(
                "improvement started on an empty population".to_string(),
            ));
        }

        let iterations = self.options.iterations;
        let offset = population.len();
        let total = offset + iterations;
        let dims = population.dimensions();
        let mut stats = ImproveStats::default();

        info!("🧬 Improving for {} iterations", iterations);

        for k in 0..iterations {
            let i1 = pick_parent_index(&mut self.rng, population.len());
            let i2 = pick_parent_index(&mut self.rng, population.len());
            let point = draw_crossover_point(&mut self.rng, dims)?;

            let child = {
                let p1 = &population.candidates()[i1].configuration;
                let p2 = &population.candidates()[i2].configuration;
                crossover_one_point(p1, p2, point)?
            };

            let score = oracle.evaluate(&child, demand)?;
            let baseline = population.worst_score();
            stats.iterations += 1;

            if score < baseline {
                if population.contains(&child) {
                    stats.rejected_duplicate += 1;
                    debug!("   it {:>5}: {} duplicate, skipped", k, child);
                } else {
                    debug!(
                        "   it {:>5}: {} ({:.3}) replaces slot {} ({:.3})",
                        k,
                        child,
                        score,
                        population.worst_index(),
                        baseline
                    );
                    population.replace_worst(Candidate::new(child, score))?;
                    stats.accepted += 1;
                }
            } else {
                stats.rejected_not_better += 1;
            }

            callback.on_progress(
                SearchPhase::Improving,
                offset + k + 1,
                total,
                population.worst_score(),
            );
        }

        info!(
            "   accepted {} | not better {} | duplicate {}",
            stats.accepted, stats.rejected_not_better, stats.rejected_duplicate
        );
        Ok(stats)
    }

    /// Seeds and improves in one go.
    pub fn run<O, CB>(
        &mut self,
        oracle: &mut O,
        demand: &DemandSchedule,
        callback: &CB,
    ) -> TuneResult<SearchOutcome>
    where
        O: Oracle + ?Sized,
        CB: ProgressCallback + ?Sized,
    {
        let mut population = self.seed_population(oracle, demand, callback)?;
        let stats = self.improve(&mut population, oracle, demand, callback)?;
        Ok(SearchOutcome {
            evaluations: population.len() + stats.iterations,
            population,
            stats,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: usize,
    pub seed: Option<u64>,
    pub outcome: SearchOutcome,
}

/// Runs independent trials in parallel. Trial `i` uses `seed + i` (wrapping) and its own oracle.
pub fn run_trials<F, O, CB>(
    options: &OptimizationOptions,
    trials: usize,
    make_oracle: F,
    demand: &DemandSchedule,
    callback: &CB,
) -> TuneResult<Vec<TrialOutcome>>
where
    F: Fn(usize) -> O + Sync,
    O: Oracle,
    CB: ProgressCallback,
{
    (0..trials)
        .into_par_iter()
        .map(|i| -> TuneResult<TrialOutcome> {
            let mut opts = options.clone();
            opts.seed = options.seed.map(|s| s.wrapping_add(i as u64));
            let seed = opts.seed;

            let mut oracle = make_oracle(i);
            let mut optimizer = Optimizer::new(opts);
            let outcome = optimizer.run(&mut oracle, demand, callback)?;
            Ok(TrialOutcome {
                trial: i,
                seed,
                outcome,
            })
        })
        .collect()
}

/// The trial whose population holds the lowest score.
pub fn best_trial(trials: &[TrialOutcome]) -> Option<&TrialOutcome> {
    trials.iter().min_by(|a, b| {
        let sa = a.outcome.best().map_or(Score::INFINITY, |c| c.score);
        let sb = b.outcome.best().map_or(Score::INFINITY, |c| c.score);
        sa.total_cmp(&sb)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Configuration;
    use crate::oracle::FnOracle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn demand() -> DemandSchedule {
        DemandSchedule::new(vec![5, 5, 5]).unwrap()
    }

    fn options(n: usize, k: usize, seed: u64) -> OptimizationOptions {
        OptimizationOptions {
            population_size: n,
            iterations: k,
            max_wait: 110,
            baseline: BaselinePolicy::TrueMax,
            seed: Some(seed),
        }
    }

    fn bowl(c: &Configuration) -> Score {
        c.offsets()
            .iter()
            .map(|&o| (o as f64 - 40.0).powi(2))
            .sum::<f64>()
            + 1.0
    }

    struct Counter(AtomicUsize);

    impl ProgressCallback for Counter {
        fn on_progress(&self, _phase: SearchPhase, _step: usize, _total: usize, _worst: Score) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_seed_calls_oracle_exactly_n_times() {
        let mut oracle = FnOracle::new(3, bowl);
        let mut opt = Optimizer::new(options(7, 0, 1));
        let pop = opt.seed_population(&mut oracle, &demand(), &Silent).unwrap();
        assert_eq!(pop.len(), 7);
        assert_eq!(oracle.calls(), 7);
        for c in pop.candidates() {
            assert!(c.configuration.offsets().iter().all(|&o| o < 110));
        }
    }

    #[test]
    fn test_run_keeps_size_and_never_worsens() {
        let mut oracle = FnOracle::new(3, bowl);
        let mut opt = Optimizer::new(options(10, 300, 5));
        let mut pop = opt.seed_population(&mut oracle, &demand(), &Silent).unwrap();
        let before_total = pop.total_score();
        let before_best = pop.best().unwrap().score;

        let stats = opt.improve(&mut pop, &mut oracle, &demand(), &Silent).unwrap();

        assert_eq!(pop.len(), 10);
        assert_eq!(oracle.calls(), 310);
        assert_eq!(
            stats.accepted + stats.rejected_not_better + stats.rejected_duplicate,
            300
        );
        assert!(pop.total_score() <= before_total);
        assert!(pop.best().unwrap().score <= before_best);
    }

    #[test]
    fn test_improve_on_empty_population_fails() {
        let mut oracle = FnOracle::new(3, bowl);
        let mut opt = Optimizer::new(options(3, 5, 1));
        let mut empty = Population::with_capacity(3);
        let err = opt
            .improve(&mut empty, &mut oracle, &demand(), &Silent)
            .unwrap_err();
        assert!(matches!(err, TuneError::Invariant(_)));
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn test_single_offset_cannot_improve() {
        let mut oracle = FnOracle::new(1, bowl);
        let mut opt = Optimizer::new(options(3, 5, 1));
        let err = opt.run(&mut oracle, &demand(), &Silent).unwrap_err();
        assert!(matches!(err, TuneError::Invariant(_)));
    }

    #[test]
    fn test_callback_sees_every_evaluation() {
        let counter = Counter(AtomicUsize::new(0));
        let mut oracle = FnOracle::new(3, bowl);
        let mut opt = Optimizer::new(options(4, 20, 9));
        let outcome = opt.run(&mut oracle, &demand(), &counter).unwrap();
        assert_eq!(counter.0.load(Ordering::Relaxed), 24);
        assert_eq!(outcome.evaluations, 24);
    }

    #[test]
    fn test_duplicate_children_are_rejected() {
        // Both members share one configuration, so every child is a copy.
        let mut oracle = FnOracle::new(3, |_: &Configuration| 1.0);
        let mut pop = Population::with_capacity(2);
        pop.push(Candidate::new(Configuration::new(vec![4, 4, 4]), 5.0))
            .unwrap();
        pop.push(Candidate::new(Configuration::new(vec![4, 4, 4]), 9.0))
            .unwrap();
        pop.finish_seeding(BaselinePolicy::TrueMax).unwrap();

        let mut opt = Optimizer::new(options(2, 25, 3));
        let stats = opt.improve(&mut pop, &mut oracle, &demand(), &Silent).unwrap();

        assert_eq!(stats.rejected_duplicate, 25);
        assert_eq!(stats.accepted, 0);
        assert_eq!(pop.worst_score(), 9.0);
        assert_eq!(pop.total_score(), 14.0);
    }

    #[test]
    fn test_child_tying_the_worst_is_rejected() {
        let mut pop = Population::with_capacity(2);
        pop.push(Candidate::new(Configuration::new(vec![1, 2, 3]), 4.0))
            .unwrap();
        pop.push(Candidate::new(Configuration::new(vec![7, 8, 9]), 9.0))
            .unwrap();
        pop.finish_seeding(BaselinePolicy::TrueMax).unwrap();
        let before = pop.candidates().to_vec();

        let mut oracle = FnOracle::new(3, |_: &Configuration| 9.0);
        let mut opt = Optimizer::new(options(2, 30, 11));
        let stats = opt.improve(&mut pop, &mut oracle, &demand(), &Silent).unwrap();

        assert_eq!(stats.accepted, 0);
        assert_eq!(stats.rejected_not_better, 30);
        assert_eq!(stats.rejected_duplicate, 0);
        assert_eq!(pop.candidates(), before.as_slice());
        assert_eq!(pop.worst_index(), 1);
    }

    #[test]
    fn test_trial_seeds_wrap_at_u64_max() {
        let opts = options(3, 5, u64::MAX);
        let trials = run_trials(
            &opts,
            2,
            |_| FnOracle::new(3, |_: &Configuration| 1.0),
            &demand(),
            &Silent,
        )
        .unwrap();
        let seeds: Vec<Option<u64>> = trials.iter().map(|t| t.seed).collect();
        assert_eq!(seeds, vec![Some(u64::MAX), Some(0)]);
    }

    #[test]
    fn test_trials_are_seeded_independently() {
        let opts = options(5, 40, 100);
        let trials = run_trials(&opts, 3, |_| FnOracle::new(3, bowl), &demand(), &Silent).unwrap();
        assert_eq!(trials.len(), 3);
        let seeds: Vec<Option<u64>> = trials.iter().map(|t| t.seed).collect();
        assert_eq!(seeds, vec![Some(100), Some(101), Some(102)]);

        let again = run_trials(&opts, 3, |_| FnOracle::new(3, bowl), &demand(), &Silent).unwrap();
        for (a, b) in trials.iter().zip(&again) {
            assert_eq!(a.outcome.population.candidates(), b.outcome.population.candidates());
        }

        let best = best_trial(&trials).unwrap();
        for t in &trials {
            assert!(best.outcome.best().unwrap().score <= t.outcome.best().unwrap().score);
        }
    }
}
