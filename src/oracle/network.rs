use super::OracleError;
use crate::core_types::Offset;
use serde::{Deserialize, Serialize};

/// A one-way road segment ending at a traffic light.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    pub id: u32,
    /// Maximum number of agents on the street at once.
    pub capacity: usize,
    /// Length in meters.
    pub length: f64,
    /// Free-flow speed in meters per tick.
    pub v_max: f64,
}

impl Street {
    pub fn new(id: u32, capacity: usize, length: f64, v_max: f64) -> Self {
        Self {
            id,
            capacity,
            length,
            v_max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficLight {
    pub id: u32,
    pub green: u32,
    pub red: u32,
    /// Agents allowed through per tick while green.
    pub capacity: usize,
    pub offset: Offset,
}

impl TrafficLight {
    pub fn new(id: u32, green: u32, red: u32) -> Self {
        Self {
            id,
            green,
            red,
            capacity: 1,
            offset: 0,
        }
    }

    pub fn cycle(&self) -> u32 {
        self.green + self.red
    }

    #[inline(always)]
    pub fn is_green(&self, tick: u64) -> bool {
        let cycle = self.cycle() as u64;
        if cycle == 0 {
            return true;
        }
        (tick + self.offset as u64) % cycle < self.green as u64
    }
}

/// A linear corridor: `streets[i]` feeds into `lights[i]`. The last light
/// guards the destination.
#[derive(Debug, Clone, Serialize)]
pub struct Network {
    pub(super) streets: Vec<Street>,
    pub(super) lights: Vec<TrafficLight>,
    /// Indices into `lights` driven by a configuration, in configuration order.
    pub(super) tuned_lights: Vec<usize>,
}

impl Network {
    /// Checks that every street ends at its own light and every tuned index exists.
    pub fn new(
        streets: Vec<Street>,
        lights: Vec<TrafficLight>,
        tuned_lights: Vec<usize>,
    ) -> Result<Self, OracleError> {
        if streets.is_empty() {
            return Err(OracleError::Network("corridor has no streets".to_string()));
        }
        if lights.len() != streets.len() {
            return Err(OracleError::Network(format!(
                "{} streets need {} lights, got {}",
                streets.len(),
                streets.len(),
                lights.len()
            )));
        }
        for (pos, &idx) in tuned_lights.iter().enumerate() {
            if idx >= lights.len() {
                return Err(OracleError::Network(format!(
                    "tuned light index {} is out of range for {} lights",
                    idx,
                    lights.len()
                )));
            }
            if tuned_lights[..pos].contains(&idx) {
                return Err(OracleError::Network(format!(
                    "light index {} is tuned twice",
                    idx
                )));
            }
        }
        Ok(Self {
            streets,
            lights,
            tuned_lights,
        })
    }

    /// The four-intersection corridor of the reference experiment.
    pub fn standard() -> Self {
        let streets = vec![
            Street::new(1, 50, 326.0, 12.0),
            Street::new(6, 32, 171.0, 12.0),
            Street::new(11, 38, 209.0, 12.0),
            Street::new(16, 35, 75.0, 12.0),
        ];
        let lights = vec![
            TrafficLight::new(1, 40, 70),
            TrafficLight::new(2, 50, 75),
            TrafficLight::new(3, 40, 70),
            TrafficLight::new(4, 50, 75),
        ];
        Self {
            streets,
            lights,
            tuned_lights: vec![1, 2, 3],
        }
    }

    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    pub fn lights(&self) -> &[TrafficLight] {
        &self.lights
    }

    pub fn tuned_lights(&self) -> &[usize] {
        &self.tuned_lights
    }

    pub fn tuned_count(&self) -> usize {
        self.tuned_lights.len()
    }

    /// Shortest cycle among the tuned lights.
    pub fn shortest_tuned_cycle(&self) -> Option<u32> {
        self.tuned_lights
            .iter()
            .map(|&i| self.lights[i].cycle())
            .min()
    }

    pub fn total_length(&self) -> f64 {
        self.streets.iter().map(|s| s.length).sum()
    }
}
