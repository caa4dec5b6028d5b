use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase offset of one traffic light, in ticks.
pub type Offset = u32;

/// Mean travel time in ticks. Lower is better.
pub type Score = f64;

/// An immutable vector of phase offsets, one per tuned light.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Vec<Offset>);

impl Configuration {
    pub fn new(offsets: Vec<Offset>) -> Self {
        Self(offsets)
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|o| o.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// A configuration together with the score the oracle gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub configuration: Configuration,
    pub score: Score,
}

impl Candidate {
    pub fn new(configuration: Configuration, score: Score) -> Self {
        Self {
            configuration,
            score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub seed: Option<u64>,
    pub best: Candidate,
    pub population: Vec<Candidate>,
}
