use crate::reports;
use clap::Args;
use greenwave::config::Config;
use greenwave::core_types::OptimizationResult;
use greenwave::demand::DemandSchedule;
use greenwave::error::{TuneError, TuneResult};
use greenwave::optimizer::{best_trial, run_trials, OptimizationOptions};
use greenwave::oracle::{Corridor, Network, PhasePlan};
use greenwave::trace;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    /// Print a percentage indicator while evaluating.
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Also write the final population as JSON.
    #[arg(long)]
    pub json: Option<String>,

    /// Replay the best configuration and write its flux series as CSV.
    #[arg(long)]
    pub trace: Option<String>,
}

pub fn run(args: SearchArgs, demand: &DemandSchedule) -> TuneResult<()> {
    args.config.validate()?;
    let options = OptimizationOptions::from(&args.config);
    let sim = args.config.sim.clone();
    let trials = args.config.search.trials;
    let network = Network::standard();

    let shortest_cycle = network.shortest_tuned_cycle().unwrap_or(0);
    if options.max_wait > shortest_cycle {
        warn!(
            "⚠️  --max-wait {} exceeds the shortest tuned cycle ({}); out-of-cycle draws will abort the run",
            options.max_wait, shortest_cycle
        );
    }

    info!(
        "🔥 {} trial(s) | population {} | {} iterations | seed {:?} | horizon {} ticks",
        trials,
        options.population_size,
        options.iterations,
        options.seed,
        demand.horizon(sim.slice_ticks)
    );

    let bar = reports::LoadingBar::new(args.progress && trials == 1);
    let outcomes = run_trials(
        &options,
        trials,
        |_| Corridor::new(network.clone(), sim.clone()),
        demand,
        &bar,
    )?;
    bar.finish();

    let winner = best_trial(&outcomes)
        .ok_or_else(|| TuneError::Invariant("no trial produced a population".to_string()))?;
    let champion = winner
        .outcome
        .best()
        .cloned()
        .ok_or_else(|| TuneError::Invariant("final population is empty".to_string()))?;

    if outcomes.len() > 1 {
        reports::print_trial_summary(&outcomes);
    }

    println!("\n=== 🏁 FINAL POPULATION ===");
    reports::print_population("RESULTS", &winner.outcome.population);
    reports::print_stats(&winner.outcome.stats);
    reports::print_best(&champion);
    reports::print_worst(&winner.outcome.population);

    if let Some(path) = &args.json {
        let result = OptimizationResult {
            seed: winner.seed,
            best: champion.clone(),
            population: winner.outcome.population.candidates().to_vec(),
        };
        reports::write_json(path, &result)?;
        info!("💾 Population written to {}", path);
    }

    if let Some(path) = &args.trace {
        let mut corridor = Corridor::new(network.clone(), sim.clone());
        let report = corridor.run_episode(&PhasePlan::fixed(champion.configuration.clone()), demand)?;
        trace::write_flux_file(path, &report.flux)?;
        info!("💾 Flux series written to {}", path);
    }

    Ok(())
}
