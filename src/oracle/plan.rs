use super::OracleError;
use crate::core_types::Configuration;
use crate::error::{TuneError, TuneResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSwitch {
    pub at_tick: u64,
    pub offsets: Configuration,
}

/// Decides which offsets are applied at each re-application boundary of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhasePlan {
    /// Applied once at tick 0 and held for the whole episode.
    Fixed { offsets: Configuration },
    /// Switches at absolute ticks.
    Timed { switches: Vec<PhaseSwitch> },
    /// Picks `low` or `high` from the demand of the current slice.
    DemandAdaptive {
        threshold: u32,
        low: Configuration,
        high: Configuration,
    },
}

/// Which plan entry is currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Fixed,
    Switch(usize),
    Low,
    High,
}

impl PhasePlan {
    pub fn fixed(offsets: Configuration) -> Self {
        PhasePlan::Fixed { offsets }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TuneResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TuneError::Config(format!(
                "could not read phase plan '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, PhasePlan::Fixed { .. })
    }

    pub fn validate(&self, dimensions: usize, reapply_ticks: u32) -> Result<(), OracleError> {
        let check = |c: &Configuration| {
            if c.len() != dimensions {
                Err(OracleError::Dimension {
                    expected: dimensions,
                    got: c.len(),
                })
            } else {
                Ok(())
            }
        };

        match self {
            PhasePlan::Fixed { offsets } => check(offsets),
            PhasePlan::Timed { switches } => {
                if switches.is_empty() {
                    return Err(OracleError::Plan("timed plan has no switches".to_string()));
                }
                for s in switches {
                    check(&s.offsets)?;
                    if s.at_tick % reapply_ticks.max(1) as u64 != 0 {
                        return Err(OracleError::Plan(format!(
                            "switch at tick {} is not on a {}-tick boundary",
                            s.at_tick, reapply_ticks
                        )));
                    }
                }
                Ok(())
            }
            PhasePlan::DemandAdaptive { low, high, .. } => {
                check(low)?;
                check(high)
            }
        }
    }

    /// Offsets to apply at the boundary `tick`, if the regime changes there.
    pub fn offsets_at(
        &self,
        tick: u64,
        slice_demand: u32,
        current: &mut Option<Regime>,
    ) -> Option<&Configuration> {
        match self {
            PhasePlan::Fixed { offsets } => {
                if current.is_none() {
                    *current = Some(Regime::Fixed);
                    Some(offsets)
                } else {
                    None
                }
            }
            PhasePlan::Timed { switches } => {
                let (idx, switch) = switches
                    .iter()
                    .enumerate()
                    .find(|(_, s)| s.at_tick == tick)?;
                *current = Some(Regime::Switch(idx));
                Some(&switch.offsets)
            }
            PhasePlan::DemandAdaptive {
                threshold,
                low,
                high,
            } => {
                let (wanted, offsets) = if slice_demand < *threshold {
                    (Regime::Low, low)
                } else {
                    (Regime::High, high)
                };
                if *current == Some(wanted) {
                    None
                } else {
                    *current = Some(wanted);
                    Some(offsets)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(v: &[u32]) -> Configuration {
        Configuration::new(v.to_vec())
    }

    #[test]
    fn test_fixed_applies_once() {
        let plan = PhasePlan::fixed(cfg(&[1, 2, 3]));
        let mut state = None;
        assert_eq!(plan.offsets_at(0, 5, &mut state), Some(&cfg(&[1, 2, 3])));
        assert_eq!(plan.offsets_at(300, 5, &mut state), None);
    }

    #[test]
    fn test_timed_switches_on_exact_ticks() {
        let plan = PhasePlan::Timed {
            switches: vec![
                PhaseSwitch {
                    at_tick: 0,
                    offsets: cfg(&[83, 4, 36]),
                },
                PhaseSwitch {
                    at_tick: 600,
                    offsets: cfg(&[67, 25, 11]),
                },
            ],
        };
        let mut state = None;
        assert_eq!(plan.offsets_at(0, 0, &mut state), Some(&cfg(&[83, 4, 36])));
        assert_eq!(plan.offsets_at(300, 0, &mut state), None);
        assert_eq!(plan.offsets_at(600, 0, &mut state), Some(&cfg(&[67, 25, 11])));
        assert_eq!(state, Some(Regime::Switch(1)));
    }

    #[test]
    fn test_adaptive_only_reapplies_on_regime_change() {
        let plan = PhasePlan::DemandAdaptive {
            threshold: 10,
            low: cfg(&[1, 1, 1]),
            high: cfg(&[2, 2, 2]),
        };
        let mut state = None;
        assert_eq!(plan.offsets_at(0, 3, &mut state), Some(&cfg(&[1, 1, 1])));
        assert_eq!(plan.offsets_at(300, 9, &mut state), None);
        assert_eq!(plan.offsets_at(600, 10, &mut state), Some(&cfg(&[2, 2, 2])));
        assert_eq!(plan.offsets_at(900, 40, &mut state), None);
        assert_eq!(plan.offsets_at(1200, 0, &mut state), Some(&cfg(&[1, 1, 1])));
    }

    #[test]
    fn test_validate_catches_misaligned_switch() {
        let plan = PhasePlan::Timed {
            switches: vec![PhaseSwitch {
                at_tick: 250,
                offsets: cfg(&[0, 0, 0]),
            }],
        };
        assert!(matches!(plan.validate(3, 300), Err(OracleError::Plan(_))));
        assert!(matches!(
            PhasePlan::fixed(cfg(&[0, 0])).validate(3, 300),
            Err(OracleError::Dimension { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"kind":"demand_adaptive","threshold":10,"low":[1,2,3],"high":[4,5,6]}"#;
        let plan: PhasePlan = serde_json::from_str(json).unwrap();
        assert_eq!(
            plan,
            PhasePlan::DemandAdaptive {
                threshold: 10,
                low: cfg(&[1, 2, 3]),
                high: cfg(&[4, 5, 6]),
            }
        );
    }
}
