use crate::core_types::{Configuration, Offset};
use fastrand::Rng;

/// Draws every offset independently and uniformly from `[0, max_wait)`.
pub fn random_configuration(rng: &mut Rng, dimensions: usize, max_wait: Offset) -> Configuration {
    let offsets = (0..dimensions).map(|_| rng.u32(0..max_wait)).collect();
    Configuration::new(offsets)
}
