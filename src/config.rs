use crate::error::{TuneError, TuneResult};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Args, Debug, Clone, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub sim: SimulationParams,
}

/// Where the first acceptance threshold comes from after seeding.
#[derive(
    ValueEnum, Display, EnumString, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BaselinePolicy {
    /// Scan the seeded population for its true maximum.
    TrueMax,
    /// Use the score of the last seeded candidate, even when an earlier one is worse.
    LastSeeded,
}

#[derive(Args, Debug, Clone)]
pub struct SearchParams {
    #[arg(long, default_value_t = 10)]
    pub population_size: usize,
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,
    /// Exclusive upper bound for every sampled phase offset.
    #[arg(long, default_value_t = 110)]
    pub max_wait: u32,
    #[arg(long, value_enum, default_value_t = BaselinePolicy::TrueMax)]
    pub baseline: BaselinePolicy,
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = 1)]
    pub trials: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SimulationParams {
    /// Ticks per demand slice.
    #[arg(long, default_value_t = 60)]
    pub slice_ticks: u32,
    /// Phase plans are (re)applied only on multiples of this many ticks.
    #[arg(long, default_value_t = 300)]
    pub reapply_ticks: u32,
    #[arg(long, default_value_t = 69)]
    pub sim_seed: u64,
    #[arg(long, default_value_t = 0.0)]
    pub error_probability: f64,
    #[arg(long, default_value_t = 0.1)]
    pub min_speed_ratio: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            population_size: 10,
            iterations: 1000,
            max_wait: 110,
            baseline: BaselinePolicy::TrueMax,
            seed: None,
            trials: 1,
        }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            slice_ticks: 60,
            reapply_ticks: 300,
            sim_seed: 69,
            error_probability: 0.0,
            min_speed_ratio: 0.1,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> TuneResult<()> {
        if self.population_size == 0 {
            return Err(TuneError::Config(
                "--population-size must be at least 1".to_string(),
            ));
        }
        if self.max_wait == 0 {
            return Err(TuneError::Config("--max-wait must be at least 1".to_string()));
        }
        if self.trials == 0 {
            return Err(TuneError::Config("--trials must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl SimulationParams {
    pub fn validate(&self) -> TuneResult<()> {
        if self.slice_ticks == 0 || self.reapply_ticks == 0 {
            return Err(TuneError::Config(
                "--slice-ticks and --reapply-ticks must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(TuneError::Config(format!(
                "--error-probability {} is outside [0, 1]",
                self.error_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.min_speed_ratio) {
            return Err(TuneError::Config(format!(
                "--min-speed-ratio {} is outside [0, 1]",
                self.min_speed_ratio
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> TuneResult<()> {
        self.search.validate()?;
        self.sim.validate()
    }
}
