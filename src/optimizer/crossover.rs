use crate::core_types::Configuration;
use crate::error::{TuneError, TuneResult};
use fastrand::Rng;

/// Uniform index over `[0, len)`.
#[inline]
pub fn pick_parent_index(rng: &mut Rng, len: usize) -> usize {
    rng.usize(0..len)
}

/// Uniform cut point over `[1, len - 1]`.
pub fn draw_crossover_point(rng: &mut Rng, len: usize) -> TuneResult<usize> {
    if len < 2 {
        return Err(TuneError::Invariant(format!(
            "configurations of length {} cannot be crossed",
            len
        )));
    }
    Ok(rng.usize(1..len))
}

/// One-point crossover: `[0, point)` from `p1`, `[point, len)` from `p2`.
pub fn crossover_one_point(
    p1: &Configuration,
    p2: &Configuration,
    point: usize,
) -> TuneResult<Configuration> {
    let len = p1.len();
    if p2.len() != len {
        return Err(TuneError::Invariant(format!(
            "parent lengths differ ({} vs {})",
            len,
            p2.len()
        )));
    }
    if point < 1 || point >= len {
        return Err(TuneError::Invariant(format!(
            "crossover point {} outside [1, {}]",
            point,
            len.saturating_sub(1)
        )));
    }

    let mut child = Vec::with_capacity(len);
    child.extend_from_slice(&p1.offsets()[..point]);
    child.extend_from_slice(&p2.offsets()[point..]);
    Ok(Configuration::new(child))
}
