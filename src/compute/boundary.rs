//! Domain-edge boundary conditions.
//!
//! The projection only visits interior cells, so the outer ring is fixed up
//! here once per tick: a constant inflow is written into one column, tracer
//! is seeded alongside it, and the tangential velocity on every edge is
//! copied from the adjacent interior line (zero-gradient extrapolation).
//!
//! Inflow is written before extrapolating so that the edge copies already
//! see it; this makes the whole pass idempotent.

use super::FluidState;
use crate::schema::{BoundaryConfig, InflowConfig, MarkerConfig};

/// Apply the full boundary policy.
pub fn apply_boundaries(state: &mut FluidState, config: &BoundaryConfig) {
    if let Some(inflow) = &config.inflow {
        inject_inflow(state, inflow);
        if let Some(marker) = &config.marker {
            seed_marker(state, marker, inflow);
        }
    }
    extrapolate_edges(state);
}

/// Overwrite the x-velocity of the inflow column.
pub fn inject_inflow(state: &mut FluidState, inflow: &InflowConfig) {
    let height = state.height;
    let column = inflow.column.min(state.width - 1);
    let start = column * height;
    let u = state.u.as_mut_slice();
    for j in inflow.row_range(height) {
        u[start + j] = inflow.speed;
    }
}

/// Seed tracer into the inflow column for the configured band.
pub fn seed_marker(state: &mut FluidState, marker: &MarkerConfig, inflow: &InflowConfig) {
    let height = state.height;
    let column = inflow.column.min(state.width - 1);
    let start = column * height;
    let smoke = state.smoke.as_mut_slice();
    for j in 1..height - 1 {
        if marker.covers_row(j, height) {
            smoke[start + j] = marker.value;
        }
    }
}

/// Copy tangential velocities from the first interior line onto each edge:
/// `u` into rows `0` and `height - 1`, `v` into columns `0` and `width - 1`.
pub fn extrapolate_edges(state: &mut FluidState) {
    let width = state.width;
    let height = state.height;

    let u = state.u.as_mut_slice();
    for i in 0..width {
        let col = i * height;
        u[col] = u[col + 1];
        u[col + height - 1] = u[col + height - 2];
    }

    let v = state.v.as_mut_slice();
    let last = (width - 1) * height;
    for j in 0..height {
        v[j] = v[height + j];
        v[last + j] = v[last - height + j];
    }
}
