//! Fluid solver - Main simulation driver.
//!
//! Orchestrates all computation stages for each tick:
//! gravity, pressure reset, projection, boundaries, velocity advection and
//! marker advection, in that order.

use serde::{Deserialize, Serialize};

use crate::schema::{ConfigError, SimulationConfig};

use super::{Field, FluidState, Projection, advect_smoke, advect_velocity, apply_boundaries};

/// CPU fluid solver.
///
/// Owns the configuration and the scratch buffers used by advection, so a
/// tick never allocates.
pub struct FluidSolver {
    config: SimulationConfig,
    projection: Projection,
    /// Scratch buffer for x-velocity (swapped with the state each tick).
    u_scratch: Field,
    /// Scratch buffer for y-velocity.
    v_scratch: Field,
    /// Scratch buffer for the marker.
    smoke_scratch: Field,
}

impl FluidSolver {
    /// Create new solver from configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let width = config.width;
        let height = config.height;
        let h = config.cell_size;

        log::debug!(
            "creating {}x{} solver (h={}, rho={}, omega={})",
            width,
            height,
            h,
            config.density,
            config.over_relaxation
        );

        Ok(Self {
            projection: Projection {
                density: config.density,
                over_relaxation: config.over_relaxation,
            },
            u_scratch: Field::x_faces(width, height, h),
            v_scratch: Field::y_faces(width, height, h),
            smoke_scratch: Field::centered(width, height, h),
            config,
        })
    }

    /// Advance the state by one tick.
    pub fn step(&mut self, state: &mut FluidState, dt: f32, gravity: f32, iterations: usize) {
        debug_assert_eq!(
            (state.width, state.height),
            (self.config.width, self.config.height),
            "state does not match solver dimensions"
        );

        // 1. Gravity on every open y-face
        integrate_gravity(state, dt, gravity);

        // 2. Pressure carries no memory across ticks
        state.p.fill(0.0);

        // 3. Divergence removal
        let residual = self.projection.solve(state, iterations, dt);

        // 4. Edge policy
        apply_boundaries(state, &self.config.boundary);

        // 5. Advection (velocity first, marker through the new velocity)
        advect_velocity(state, &mut self.u_scratch, &mut self.v_scratch, dt);
        advect_smoke(state, &mut self.smoke_scratch, dt);

        state.time += dt;
        state.step += 1;

        log::trace!("tick {}: residual divergence {:.3e}", state.step, residual);

        #[cfg(debug_assertions)]
        if let Err(err) = state.check_finite() {
            log::error!("tick {} produced {}", state.step, err);
            panic!("non-finite fluid state after tick {}: {}", state.step, err);
        }
    }

    /// Advance one tick using the configured dt, gravity and iteration count.
    pub fn tick(&mut self, state: &mut FluidState) {
        let SimulationConfig {
            dt,
            gravity,
            iterations,
            ..
        } = self.config;
        self.step(state, dt, gravity, iterations);
    }

    /// Run simulation for specified number of ticks.
    pub fn run(&mut self, state: &mut FluidState, ticks: u64) {
        for _ in 0..ticks {
            self.tick(state);
        }
    }

    /// Apply the boundary policy outside a tick, e.g. to prime the inflow.
    pub fn apply_boundaries(&self, state: &mut FluidState) {
        apply_boundaries(state, &self.config.boundary);
    }

    /// Get configuration reference.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// Accelerate every y-face whose two adjacent cells are open.
pub fn integrate_gravity(state: &mut FluidState, dt: f32, gravity: f32) {
    if gravity == 0.0 {
        return;
    }
    let width = state.width;
    let height = state.height;
    let s = state.s.as_slice();
    let v = state.v.as_mut_slice();
    for i in 1..width {
        for j in 1..height - 1 {
            let idx = i * height + j;
            if s[idx] != 0.0 && s[idx - 1] != 0.0 {
                v[idx] += gravity * dt;
            }
        }
    }
}

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidStats {
    pub min_pressure: f32,
    pub max_pressure: f32,
    pub max_speed: f32,
    pub total_smoke: f32,
    pub max_divergence: f32,
    pub fluid_cells: usize,
    pub non_finite: usize,
}

impl FluidStats {
    /// Compute statistics from state.
    pub fn from_state(state: &FluidState) -> Self {
        let (min_pressure, max_pressure) = state.p.min_max();

        let mut max_speed = 0.0f32;
        let mut max_divergence = 0.0f32;
        for i in 1..state.width - 1 {
            for j in 1..state.height - 1 {
                if !state.is_fluid(i, j) {
                    continue;
                }
                max_speed = max_speed.max(state.speed(i, j));
                max_divergence = max_divergence.max(state.divergence(i, j).abs());
            }
        }

        let non_finite = [&state.u, &state.v, &state.p]
            .iter()
            .map(|field| field.as_slice().iter().filter(|v| !v.is_finite()).count())
            .sum();

        Self {
            min_pressure,
            max_pressure,
            max_speed,
            total_smoke: state.smoke.sum(),
            max_divergence,
            fluid_cells: state.fluid_cells(),
            non_finite,
        }
    }
}
