//! Semi-Lagrangian advection of velocity and marker.
//!
//! Every sample point is traced backward along the current velocity by `dt`
//! and the previous field is interpolated there. Results are written into a
//! scratch field (pre-filled with the source so skipped cells keep their
//! value) which is then swapped into the state, so a pass never reads its
//! own output.

use super::{Field, FluidState};

/// Average of the four y-velocities around the x-face of cell `(i, j)`.
#[inline]
fn average_v(v: &[f32], idx: usize, stride: usize) -> f32 {
    0.25 * (v[idx - stride] + v[idx] + v[idx - stride + 1] + v[idx + 1])
}

/// Average of the four x-velocities around the y-face of cell `(i, j)`.
#[inline]
fn average_u(u: &[f32], idx: usize, stride: usize) -> f32 {
    0.25 * (u[idx - 1] + u[idx] + u[idx + stride - 1] + u[idx + stride])
}

/// Advect both velocity components through the velocity field itself.
///
/// A face is advected only when both cells sharing it are open; faces on a
/// solid keep their value.
pub fn advect_velocity(
    state: &mut FluidState,
    u_scratch: &mut Field,
    v_scratch: &mut Field,
    dt: f32,
) {
    let width = state.width;
    let height = state.height;
    let h = state.cell_size;
    let half = 0.5 * h;

    u_scratch.copy_from(&state.u);
    v_scratch.copy_from(&state.v);

    let s = state.s.as_slice();
    let u = state.u.as_slice();
    let v = state.v.as_slice();
    let u_next = u_scratch.as_mut_slice();
    let v_next = v_scratch.as_mut_slice();

    for i in 1..width {
        for j in 1..height {
            let idx = i * height + j;
            if s[idx] == 0.0 {
                continue;
            }

            if s[idx - height] != 0.0 && j < height - 1 {
                let x = i as f32 * h;
                let y = j as f32 * h + half;
                let vel_u = u[idx];
                let vel_v = average_v(v, idx, height);
                u_next[idx] = state.u.sample(x - dt * vel_u, y - dt * vel_v);
            }

            if s[idx - 1] != 0.0 && i < width - 1 {
                let x = i as f32 * h + half;
                let y = j as f32 * h;
                let vel_u = average_u(u, idx, height);
                let vel_v = v[idx];
                v_next[idx] = state.v.sample(x - dt * vel_u, y - dt * vel_v);
            }
        }
    }

    std::mem::swap(&mut state.u, u_scratch);
    std::mem::swap(&mut state.v, v_scratch);
}

/// Advect the marker through the cell-centered velocity of each open cell.
pub fn advect_smoke(state: &mut FluidState, smoke_scratch: &mut Field, dt: f32) {
    let width = state.width;
    let height = state.height;
    let h = state.cell_size;
    let half = 0.5 * h;

    smoke_scratch.copy_from(&state.smoke);

    let s = state.s.as_slice();
    let u = state.u.as_slice();
    let v = state.v.as_slice();
    let next = smoke_scratch.as_mut_slice();

    for i in 1..width - 1 {
        for j in 1..height - 1 {
            let idx = i * height + j;
            if s[idx] == 0.0 {
                continue;
            }
            let vel_u = 0.5 * (u[idx] + u[idx + height]);
            let vel_v = 0.5 * (v[idx] + v[idx + 1]);
            let x = i as f32 * h + half - dt * vel_u;
            let y = j as f32 * h + half - dt * vel_v;
            next[idx] = state.smoke.sample(x, y);
        }
    }

    std::mem::swap(&mut state.smoke, smoke_scratch);
}
