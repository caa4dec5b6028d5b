use super::network::Network;
use super::plan::PhasePlan;
use super::{Oracle, OracleError};
use crate::config::SimulationParams;
use crate::core_types::{Configuration, Score};
use crate::demand::DemandSchedule;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Agent {
    injected_at: u64,
    position: f64,
}

/// One row of the flux time series: agents through the last light since the previous row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FluxSample {
    pub time: u64,
    pub vehicle_flux: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeReport {
    pub mean_travel_time: Score,
    pub injected: u64,
    pub completed: u64,
    pub ticks: u64,
    pub flux: Vec<FluxSample>,
}

impl EpisodeReport {
    pub fn in_flight(&self) -> u64 {
        self.injected - self.completed
    }
}

/// First-order queue simulation of a signalized corridor.
///
/// Owns its random stream and a cumulative clock. Both survive across
/// episodes; the vehicles on the network do not.
pub struct Corridor {
    network: Network,
    params: SimulationParams,
    rng: fastrand::Rng,
    clock: u64,
    evaluations: usize,

    // Episode state
    queues: Vec<VecDeque<Agent>>,
    source: VecDeque<u64>,
    flux: usize,
    completed: u64,
    completed_time: u64,
}

impl Corridor {
    pub fn new(network: Network, params: SimulationParams) -> Self {
        let rng = fastrand::Rng::with_seed(params.sim_seed);
        let queues = vec![VecDeque::new(); network.streets.len()];
        Self {
            network,
            params,
            rng,
            clock: 0,
            evaluations: 0,
            queues,
            source: VecDeque::new(),
            flux: 0,
            completed: 0,
            completed_time: 0,
        }
    }

    pub fn standard(params: SimulationParams) -> Self {
        Self::new(Network::standard(), params)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Ticks simulated across every episode so far.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Returns and resets the count of agents that passed the last light.
    pub fn take_flux(&mut self) -> usize {
        std::mem::take(&mut self.flux)
    }

    fn check_offsets(&self, configuration: &Configuration) -> Result<(), OracleError> {
        let tuned = &self.network.tuned_lights;
        if configuration.len() != tuned.len() {
            return Err(OracleError::Dimension {
                expected: tuned.len(),
                got: configuration.len(),
            });
        }
        for (&light_idx, &offset) in tuned.iter().zip(configuration.offsets()) {
            let light = &self.network.lights[light_idx];
            if offset >= light.cycle() {
                return Err(OracleError::OffsetOutOfRange {
                    light: light.id as usize,
                    offset,
                    cycle: light.cycle(),
                });
            }
        }
        Ok(())
    }

    fn apply(&mut self, configuration: &Configuration) {
        for (&light_idx, &offset) in self
            .network
            .tuned_lights
            .iter()
            .zip(configuration.offsets())
        {
            self.network.lights[light_idx].offset = offset;
        }
    }

    fn reset_episode(&mut self) {
        for q in &mut self.queues {
            q.clear();
        }
        self.source.clear();
        self.flux = 0;
        self.completed = 0;
        self.completed_time = 0;
        for &light_idx in &self.network.tuned_lights {
            self.network.lights[light_idx].offset = 0;
        }
    }

    /// Runs one full horizon under `plan`.
    pub fn run_episode(
        &mut self,
        plan: &PhasePlan,
        demand: &DemandSchedule,
    ) -> Result<EpisodeReport, OracleError> {
        plan.validate(self.network.tuned_count(), self.params.reapply_ticks)?;
        match plan {
            PhasePlan::Fixed { offsets } => self.check_offsets(offsets)?,
            PhasePlan::Timed { switches } => {
                for s in switches {
                    self.check_offsets(&s.offsets)?;
                }
            }
            PhasePlan::DemandAdaptive { low, high, .. } => {
                self.check_offsets(low)?;
                self.check_offsets(high)?;
            }
        }

        self.reset_episode();

        let slice_ticks = self.params.slice_ticks.max(1);
        let reapply_ticks = self.params.reapply_ticks.max(1) as u64;
        let horizon = demand.horizon(slice_ticks);
        let mut regime = None;
        let mut samples = Vec::with_capacity((horizon / reapply_ticks) as usize + 1);
        let mut injected = 0u64;

        for tick in 0..horizon {
            let slice_demand = demand.slice_at(tick, slice_ticks);

            if tick % reapply_ticks == 0 {
                samples.push(FluxSample {
                    time: tick,
                    vehicle_flux: self.take_flux(),
                });
                if let Some(offsets) = plan.offsets_at(tick, slice_demand, &mut regime) {
                    self.apply(offsets);
                }
            }

            if tick % slice_ticks as u64 == 0 {
                for _ in 0..slice_demand {
                    self.source.push_back(tick);
                }
                injected += slice_demand as u64;
            }

            self.step(tick);
        }

        let mut total_time = self.completed_time;
        for &t in &self.source {
            total_time += horizon - t;
        }
        for q in &self.queues {
            for a in q {
                total_time += horizon - a.injected_at;
            }
        }

        let mean_travel_time = if injected == 0 {
            0.0
        } else {
            total_time as f64 / injected as f64
        };

        self.clock += horizon;
        self.evaluations += 1;

        Ok(EpisodeReport {
            mean_travel_time,
            injected,
            completed: self.completed,
            ticks: horizon,
            flux: samples,
        })
    }

    fn step(&mut self, tick: u64) {
        let n = self.network.streets.len();
        let p_err = self.params.error_probability;
        let min_ratio = self.params.min_speed_ratio;

        // Downstream first, so space freed this tick is visible upstream.
        for s in (0..n).rev() {
            let light = &self.network.lights[s];
            let length = self.network.streets[s].length;

            if light.is_green(tick) {
                let mut passed = 0;
                while passed < light.capacity {
                    let at_stop_line = self.queues[s]
                        .front()
                        .map_or(false, |a| a.position >= length);
                    if !at_stop_line {
                        break;
                    }
                    if p_err > 0.0 && self.rng.f64() < p_err {
                        break;
                    }

                    if s + 1 < n {
                        if self.queues[s + 1].len() >= self.network.streets[s + 1].capacity {
                            break;
                        }
                        if let Some(mut agent) = self.queues[s].pop_front() {
                            agent.position = 0.0;
                            self.queues[s + 1].push_back(agent);
                        }
                    } else if let Some(agent) = self.queues[s].pop_front() {
                        self.completed += 1;
                        self.completed_time += tick + 1 - agent.injected_at;
                        self.flux += 1;
                    }
                    passed += 1;
                }
            }

            let street = &self.network.streets[s];
            let occupancy = self.queues[s].len() as f64 / street.capacity.max(1) as f64;
            let speed = street.v_max * (1.0 - (1.0 - min_ratio) * occupancy);

            let mut limit = length;
            for agent in self.queues[s].iter_mut() {
                agent.position = (agent.position + speed).min(limit);
                limit = agent.position;
            }
        }

        let entry_capacity = self.network.streets[0].capacity;
        while self.queues[0].len() < entry_capacity {
            match self.source.pop_front() {
                Some(injected_at) => self.queues[0].push_back(Agent {
                    injected_at,
                    position: 0.0,
                }),
                None => break,
            }
        }
    }
}

impl Oracle for Corridor {
    fn dimensions(&self) -> usize {
        self.network.tuned_count()
    }

    fn evaluate(
        &mut self,
        configuration: &Configuration,
        demand: &DemandSchedule,
    ) -> Result<Score, OracleError> {
        let plan = PhasePlan::fixed(configuration.clone());
        let report = self.run_episode(&plan, demand)?;
        debug!(
            "eval #{} {} -> {:.3} ({} of {} arrived)",
            self.evaluations, configuration, report.mean_travel_time, report.completed, report.injected
        );
        Ok(report.mean_travel_time)
    }
}
