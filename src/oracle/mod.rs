pub mod corridor;
pub mod network;
pub mod plan;

pub use self::corridor::{Corridor, EpisodeReport};
pub use self::network::{Network, Street, TrafficLight};
pub use self::plan::{PhasePlan, PhaseSwitch};

use crate::core_types::{Configuration, Offset, Score};
use crate::demand::DemandSchedule;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("expected {expected} offsets, got {got}")]
    Dimension { expected: usize, got: usize },

    #[error("offset {offset} for light {light} exceeds its cycle of {cycle} ticks")]
    OffsetOutOfRange {
        light: usize,
        offset: Offset,
        cycle: u32,
    },

    #[error("invalid network: {0}")]
    Network(String),

    #[error("invalid phase plan: {0}")]
    Plan(String),
}

/// A black-box scorer for phase-offset configurations.
///
/// Implementations may carry internal state (random stream, simulated clock)
/// across calls, so evaluation order matters and calls must stay sequential.
pub trait Oracle {
    /// Number of offsets a configuration must carry.
    fn dimensions(&self) -> usize;

    fn evaluate(
        &mut self,
        configuration: &Configuration,
        demand: &DemandSchedule,
    ) -> Result<Score, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn evaluate(
        &mut self,
        configuration: &Configuration,
        demand: &DemandSchedule,
    ) -> Result<Score, OracleError> {
        (**self).evaluate(configuration, demand)
    }
}

/// Wraps a closure as an oracle. Useful for analytic objectives and tests.
pub struct FnOracle<F> {
    dimensions: usize,
    func: F,
    calls: usize,
}

impl<F> FnOracle<F>
where
    F: FnMut(&Configuration) -> Score,
{
    pub fn new(dimensions: usize, func: F) -> Self {
        Self {
            dimensions,
            func,
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<F> Oracle for FnOracle<F>
where
    F: FnMut(&Configuration) -> Score,
{
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn evaluate(
        &mut self,
        configuration: &Configuration,
        _demand: &DemandSchedule,
    ) -> Result<Score, OracleError> {
        if configuration.len() != self.dimensions {
            return Err(OracleError::Dimension {
                expected: self.dimensions,
                got: configuration.len(),
            });
        }
        self.calls += 1;
        Ok((self.func)(configuration))
    }
}
