use crate::error::{TuneError, TuneResult};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Vehicles to inject per time slice, read once and shared by every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemandSchedule {
    slices: Vec<u32>,
}

impl DemandSchedule {
    pub fn new(slices: Vec<u32>) -> TuneResult<Self> {
        if slices.is_empty() {
            return Err(TuneError::Demand(
                "schedule has zero slices, horizon would be empty".to_string(),
            ));
        }
        Ok(Self { slices })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TuneResult<Self> {
        let path = path.as_ref();
        info!("📂 Loading demand schedule: {}", path.display());

        let file = File::open(path).map_err(|e| {
            TuneError::Demand(format!("could not open '{}': {}", path.display(), e))
        })?;

        let schedule = Self::from_reader(file)?;
        debug!(
            "   -> {} slices, {} vehicles total",
            schedule.len(),
            schedule.total_vehicles()
        );
        Ok(schedule)
    }

    /// Parses whitespace separated counts until end of stream.
    pub fn from_reader<R: Read>(reader: R) -> TuneResult<Self> {
        let mut slices = Vec::new();

        for (line_idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            for token in line.split_whitespace() {
                let count: u32 = token.parse().map_err(|_| {
                    TuneError::Demand(format!(
                        "line {}: '{}' is not a non-negative integer",
                        line_idx + 1,
                        token
                    ))
                })?;
                slices.push(count);
            }
        }

        Self::new(slices)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn slices(&self) -> &[u32] {
        &self.slices
    }

    pub fn total_vehicles(&self) -> u64 {
        self.slices.iter().map(|&c| c as u64).sum()
    }

    /// Total simulated ticks for the given slice length.
    pub fn horizon(&self, slice_ticks: u32) -> u64 {
        slice_ticks as u64 * self.slices.len() as u64
    }

    /// Demand of the slice containing `tick`. Ticks past the horizon clamp to the last slice.
    pub fn slice_at(&self, tick: u64, slice_ticks: u32) -> u32 {
        let idx = (tick / slice_ticks.max(1) as u64) as usize;
        self.slices[idx.min(self.slices.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parses_mixed_whitespace() {
        let data = "5 5\n\t7\n\n 0  12\n";
        let schedule = DemandSchedule::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(schedule.slices(), &[5, 5, 7, 0, 12]);
        assert_eq!(schedule.total_vehicles(), 29);
    }

    #[test]
    fn test_empty_stream_is_fatal() {
        let err = DemandSchedule::from_reader(Cursor::new("  \n\n")).unwrap_err();
        assert!(matches!(err, TuneError::Demand(_)));
    }

    #[test]
    fn test_bad_token_reports_line() {
        let err = DemandSchedule::from_reader(Cursor::new("1 2\n3 x4\n")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "unexpected message: {}", msg);
        assert!(msg.contains("x4"), "unexpected message: {}", msg);
    }

    #[test]
    fn test_negative_counts_rejected() {
        assert!(DemandSchedule::from_reader(Cursor::new("3 -1")).is_err());
    }

    #[test]
    fn test_horizon_and_slice_lookup() {
        let schedule = DemandSchedule::new(vec![1, 2, 3]).unwrap();
        assert_eq!(schedule.horizon(60), 180);
        assert_eq!(schedule.slice_at(0, 60), 1);
        assert_eq!(schedule.slice_at(59, 60), 1);
        assert_eq!(schedule.slice_at(60, 60), 2);
        assert_eq!(schedule.slice_at(179, 60), 3);
        assert_eq!(schedule.slice_at(500, 60), 3);
    }
}
