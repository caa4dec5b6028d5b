use crate::config::BaselinePolicy;
use crate::core_types::{Candidate, Configuration, Score};
use crate::error::{TuneError, TuneResult};

/// Fixed-capacity working set of candidates with the worst member tracked.
///
/// Slots are only ever appended during seeding and overwritten afterwards, so
/// the length never changes once the population is full.
#[derive(Debug, Clone)]
pub struct Population {
    capacity: usize,
    candidates: Vec<Candidate>,
    worst_index: usize,
    worst_score: Score,
}

impl Population {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            candidates: Vec::with_capacity(capacity),
            worst_index: 0,
            worst_score: Score::NEG_INFINITY,
        }
    }

    /// Appends a seeded candidate, keeping a running maximum.
    pub fn push(&mut self, candidate: Candidate) -> TuneResult<()> {
        if self.is_full() {
            return Err(TuneError::Invariant(format!(
                "population already holds {} candidates",
                self.capacity
            )));
        }
        if let Some(first) = self.candidates.first() {
            if first.configuration.len() != candidate.configuration.len() {
                return Err(TuneError::Invariant(format!(
                    "candidate has {} offsets, population holds {}",
                    candidate.configuration.len(),
                    first.configuration.len()
                )));
            }
        }

        if self.candidates.is_empty() || candidate.score > self.worst_score {
            self.worst_index = self.candidates.len();
            self.worst_score = candidate.score;
        }
        self.candidates.push(candidate);
        Ok(())
    }

    /// Sets the first acceptance baseline once seeding is complete.
    pub fn finish_seeding(&mut self, policy: BaselinePolicy) -> TuneResult<()> {
        if !self.is_full() {
            return Err(TuneError::Invariant(format!(
                "seeding stopped at {} of {} candidates",
                self.candidates.len(),
                self.capacity
            )));
        }
        match policy {
            BaselinePolicy::TrueMax => self.recompute_worst(),
            BaselinePolicy::LastSeeded => {
                self.worst_index = self.candidates.len() - 1;
                self.worst_score = self.candidates[self.worst_index].score;
            }
        }
        Ok(())
    }

    /// Overwrites the tracked worst slot, then rescans for the new worst.
    pub fn replace_worst(&mut self, candidate: Candidate) -> TuneResult<usize> {
        if self.candidates.is_empty() {
            return Err(TuneError::Invariant(
                "cannot replace into an empty population".to_string(),
            ));
        }
        let slot = self.worst_index;
        self.candidates[slot] = candidate;
        self.recompute_worst();
        Ok(slot)
    }

    /// Linear scan; ties resolve to the first occurrence.
    pub fn recompute_worst(&mut self) {
        let mut index = 0;
        let mut score = Score::NEG_INFINITY;
        for (i, c) in self.candidates.iter().enumerate() {
            if i == 0 || c.score > score {
                index = i;
                score = c.score;
            }
        }
        self.worst_index = index;
        self.worst_score = score;
    }

    pub fn contains(&self, configuration: &Configuration) -> bool {
        self.candidates
            .iter()
            .any(|c| &c.configuration == configuration)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.candidates.len() >= self.capacity
    }

    pub fn dimensions(&self) -> usize {
        self.candidates
            .first()
            .map_or(0, |c| c.configuration.len())
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn worst_index(&self) -> usize {
        self.worst_index
    }

    pub fn worst_score(&self) -> Score {
        self.worst_score
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.candidates
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }

    pub fn total_score(&self) -> Score {
        self.candidates.iter().map(|c| c.score).sum()
    }
}
