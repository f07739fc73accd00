//! Pressure projection - iterative divergence removal.
//!
//! Gauss-Seidel over-relaxation on the staggered grid. Each open interior
//! cell measures its net outflow and spreads a correction over those of its
//! four faces that border open cells. Corrections are applied in place, so
//! later cells in a sweep already see the updated faces; sweeps always run
//! column by column (`i` outer, `j` inner) to keep results reproducible.

use super::FluidState;

/// Relaxation parameters of the pressure solve.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Fluid density `rho`.
    pub density: f32,
    /// Over-relaxation factor `omega`.
    pub over_relaxation: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            density: 1000.0,
            over_relaxation: 1.9,
        }
    }
}

/// Mutable view of the arrays one relaxation step touches.
struct Stencil<'a> {
    u: &'a mut [f32],
    v: &'a mut [f32],
    s: &'a [f32],
    /// Offset between horizontally adjacent cells.
    stride: usize,
}

impl Stencil<'_> {
    /// Net outflow of the cell at `idx`.
    #[inline]
    fn divergence(&self, idx: usize) -> f32 {
        self.u[idx + self.stride] - self.u[idx] + self.v[idx + 1] - self.v[idx]
    }

    /// Relax one cell, returning the applied correction and the divergence
    /// it saw, or `None` when the cell is solid or fully enclosed.
    #[inline]
    fn relax(&mut self, idx: usize, over_relaxation: f32) -> Option<(f32, f32)> {
        if self.s[idx] == 0.0 {
            return None;
        }

        let sx0 = self.s[idx - self.stride];
        let sx1 = self.s[idx + self.stride];
        let sy0 = self.s[idx - 1];
        let sy1 = self.s[idx + 1];
        let freedom = sx0 + sx1 + sy0 + sy1;
        if freedom == 0.0 {
            return None;
        }

        let divergence = self.divergence(idx);
        let dp = -(divergence / freedom) * over_relaxation;

        self.u[idx] -= sx0 * dp;
        self.u[idx + self.stride] += sx1 * dp;
        self.v[idx] -= sy0 * dp;
        self.v[idx + 1] += sy1 * dp;

        Some((dp, divergence))
    }
}

impl Projection {
    /// Factor `rho * h / dt` turning a relaxation step into a pressure.
    #[inline]
    pub fn pressure_scale(&self, cell_size: f32, dt: f32) -> f32 {
        self.density * cell_size / dt
    }

    /// Run `iterations` relaxation sweeps over the interior cells.
    ///
    /// Pressure is accumulated on top of `state.p`; callers reset it first.
    /// Returns the largest divergence magnitude met during the last sweep.
    pub fn solve(&self, state: &mut FluidState, iterations: usize, dt: f32) -> f32 {
        let width = state.width;
        let height = state.height;
        let pressure_scale = self.pressure_scale(state.cell_size, dt);

        let FluidState { u, v, p, s, .. } = state;
        let pressure = p.as_mut_slice();
        let mut stencil = Stencil {
            u: u.as_mut_slice(),
            v: v.as_mut_slice(),
            s: s.as_slice(),
            stride: height,
        };

        let mut residual = 0.0f32;
        for _ in 0..iterations {
            residual = 0.0;
            for i in 1..width - 1 {
                for j in 1..height - 1 {
                    let idx = i * height + j;
                    if let Some((dp, divergence)) = stencil.relax(idx, self.over_relaxation) {
                        pressure[idx] += pressure_scale * dp;
                        residual = residual.max(divergence.abs());
                    }
                }
            }
        }
        residual
    }

    /// Relax a single interior cell in isolation.
    ///
    /// Returns the correction `dp`, or `None` for solid, enclosed or edge cells.
    pub fn relax_cell(&self, state: &mut FluidState, i: usize, j: usize, dt: f32) -> Option<f32> {
        if i == 0 || j == 0 || i + 1 >= state.width || j + 1 >= state.height {
            return None;
        }
        let height = state.height;
        let pressure_scale = self.pressure_scale(state.cell_size, dt);

        let FluidState { u, v, p, s, .. } = state;
        let mut stencil = Stencil {
            u: u.as_mut_slice(),
            v: v.as_mut_slice(),
            s: s.as_slice(),
            stride: height,
        };
        let idx = i * height + j;
        let (dp, _) = stencil.relax(idx, self.over_relaxation)?;
        p.as_mut_slice()[idx] += pressure_scale * dp;
        Some(dp)
    }
}
