use crate::reports;
use clap::Args;
use greenwave::config::SimulationParams;
use greenwave::core_types::Configuration;
use greenwave::demand::DemandSchedule;
use greenwave::error::{TuneError, TuneResult};
use greenwave::oracle::{Corridor, PhasePlan};
use greenwave::trace;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub sim: SimulationParams,

    /// JSON phase plan (fixed, timed or demand_adaptive).
    #[arg(long, conflicts_with = "offsets")]
    pub plan: Option<String>,

    /// Fixed offsets for the tuned lights, e.g. 83,4,36.
    #[arg(long, value_delimiter = ',')]
    pub offsets: Option<Vec<u32>>,

    /// CSV output; defaults to output.csv, or output_opt.csv for scheduled plans.
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn run(args: ReplayArgs, demand: &DemandSchedule) -> TuneResult<()> {
    args.sim.validate()?;

    let plan = match (&args.plan, &args.offsets) {
        (Some(path), _) => {
            info!("📂 Loading phase plan: {}", path);
            PhasePlan::load_from_file(path)?
        }
        (None, Some(offsets)) => PhasePlan::fixed(Configuration::new(offsets.clone())),
        (None, None) => {
            return Err(TuneError::Config(
                "replay needs either --plan or --offsets".to_string(),
            ))
        }
    };

    let output = args.output.clone().unwrap_or_else(|| {
        if plan.is_fixed() {
            "output.csv".to_string()
        } else {
            "output_opt.csv".to_string()
        }
    });

    info!("🚗 Simulating {} ticks...", demand.horizon(args.sim.slice_ticks));
    let mut corridor = Corridor::standard(args.sim.clone());
    let report = corridor.run_episode(&plan, demand)?;

    info!("💾 Writing flux series to {}", output);
    trace::write_flux_file(&output, &report.flux)?;

    reports::print_episode(&report);
    println!("Mean travel time: {:.3}", report.mean_travel_time);
    Ok(())
}
