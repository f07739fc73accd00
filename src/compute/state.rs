//! Persistent fluid state on a staggered (MAC) grid.
//!
//! Layout conventions, for cell `(i, j)`:
//! - `u(i, j)` is the x-velocity on the left face, `u(i + 1, j)` on the right face.
//! - `v(i, j)` is the y-velocity on the bottom face, `v(i, j + 1)` on the top face.
//! - `p`, `s` and `smoke` are cell-centered.
//!
//! The mask `s` is 1 for open cells and 0 for solids. Rows `0` and
//! `height - 1` start closed so no flow crosses the top or bottom of the domain.

use serde::{Deserialize, Serialize};

use super::Field;
use crate::schema::{ConfigError, SimulationConfig};

/// Selects one of the state's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[serde(alias = "u")]
    VelocityX,
    #[serde(alias = "v")]
    VelocityY,
    Pressure,
    Mask,
    Smoke,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::VelocityX => "u",
            FieldKind::VelocityY => "v",
            FieldKind::Pressure => "pressure",
            FieldKind::Mask => "mask",
            FieldKind::Smoke => "smoke",
        };
        f.write_str(name)
    }
}

/// Numerical degeneracy detected after a tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericalError {
    #[error("non-finite {field} value {value} at cell ({i}, {j})")]
    NonFinite {
        field: FieldKind,
        i: usize,
        j: usize,
        value: f32,
    },
}

/// Fluid simulation state.
///
/// Velocity, mask and marker persist across ticks; pressure is rebuilt every
/// tick and only kept for inspection.
#[derive(Debug, Clone)]
pub struct FluidState {
    /// X-velocity on left cell faces.
    pub u: Field,
    /// Y-velocity on bottom cell faces.
    pub v: Field,
    /// Pressure accumulated by the last projection.
    pub p: Field,
    /// Open mask: 1 = fluid, 0 = solid.
    pub s: Field,
    /// Passive marker.
    pub smoke: Field,
    /// Grid width (X dimension).
    pub width: usize,
    /// Grid height (Y dimension).
    pub height: usize,
    /// Cell spacing `h`.
    pub cell_size: f32,
    /// Current simulation time.
    pub time: f32,
    /// Tick count.
    pub step: u64,
}

impl FluidState {
    /// Zero-initialised state with closed top and bottom rows.
    ///
    /// Grids smaller than 3x3 have no interior and are rejected.
    pub fn new(width: usize, height: usize, cell_size: f32) -> Result<Self, ConfigError> {
        if width < 3 || height < 3 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        if !(cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }

        let mut s = Field::centered(width, height, cell_size);
        s.fill(1.0);
        for i in 0..width {
            s.set(i as isize, 0, 0.0);
            s.set(i as isize, height as isize - 1, 0.0);
        }

        Ok(Self {
            u: Field::x_faces(width, height, cell_size),
            v: Field::y_faces(width, height, cell_size),
            p: Field::centered(width, height, cell_size),
            s,
            smoke: Field::centered(width, height, cell_size),
            width,
            height,
            cell_size,
            time: 0.0,
            step: 0,
        })
    }

    /// State sized from a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.width, config.height, config.cell_size)
    }

    #[inline]
    pub fn u(&self, i: usize, j: usize) -> f32 {
        self.u.get(i as isize, j as isize)
    }

    #[inline]
    pub fn v(&self, i: usize, j: usize) -> f32 {
        self.v.get(i as isize, j as isize)
    }

    #[inline]
    pub fn pressure(&self, i: usize, j: usize) -> f32 {
        self.p.get(i as isize, j as isize)
    }

    #[inline]
    pub fn mask(&self, i: usize, j: usize) -> f32 {
        self.s.get(i as isize, j as isize)
    }

    #[inline]
    pub fn smoke(&self, i: usize, j: usize) -> f32 {
        self.smoke.get(i as isize, j as isize)
    }

    #[inline]
    pub fn is_fluid(&self, i: usize, j: usize) -> bool {
        self.mask(i, j) != 0.0
    }

    /// Field selected by `kind`.
    pub fn field(&self, kind: FieldKind) -> &Field {
        match kind {
            FieldKind::VelocityX => &self.u,
            FieldKind::VelocityY => &self.v,
            FieldKind::Pressure => &self.p,
            FieldKind::Mask => &self.s,
            FieldKind::Smoke => &self.smoke,
        }
    }

    fn field_mut(&mut self, kind: FieldKind) -> &mut Field {
        match kind {
            FieldKind::VelocityX => &mut self.u,
            FieldKind::VelocityY => &mut self.v,
            FieldKind::Pressure => &mut self.p,
            FieldKind::Mask => &mut self.s,
            FieldKind::Smoke => &mut self.smoke,
        }
    }

    /// Velocity at the cell center, averaged from the bounding faces.
    pub fn cell_velocity(&self, i: usize, j: usize) -> (f32, f32) {
        let (i, j) = (i as isize, j as isize);
        let u = 0.5 * (self.u.get(i, j) + self.u.get(i + 1, j));
        let v = 0.5 * (self.v.get(i, j) + self.v.get(i, j + 1));
        (u, v)
    }

    pub fn speed(&self, i: usize, j: usize) -> f32 {
        let (u, v) = self.cell_velocity(i, j);
        (u * u + v * v).sqrt()
    }

    /// Net outflow of cell `(i, j)` through its four faces.
    pub fn divergence(&self, i: usize, j: usize) -> f32 {
        let (i, j) = (i as isize, j as isize);
        self.u.get(i + 1, j) - self.u.get(i, j) + self.v.get(i, j + 1) - self.v.get(i, j)
    }

    /// Stamp `value` into a rectangle of cells, clipped to the grid.
    ///
    /// Mask values are snapped to {0, 1}.
    pub fn set_region(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        target: FieldKind,
        value: f32,
    ) {
        let value = if target == FieldKind::Mask {
            if value >= 0.5 { 1.0 } else { 0.0 }
        } else {
            value
        };
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        let field = self.field_mut(target);
        for i in x.min(x_end)..x_end {
            for j in y.min(y_end)..y_end {
                let idx = field.idx(i, j);
                field.as_mut_slice()[idx] = value;
            }
        }
    }

    /// Carve a solid rectangle.
    pub fn solidify_region(&mut self, x: usize, y: usize, w: usize, h: usize) {
        self.set_region(x, y, w, h, FieldKind::Mask, 0.0);
    }

    /// Seed marker into a rectangle.
    pub fn smoke_region(&mut self, x: usize, y: usize, w: usize, h: usize, value: f32) {
        self.set_region(x, y, w, h, FieldKind::Smoke, value);
    }

    /// Turn a square of cells around `(ci, cj)` solid, clearing their marker
    /// and the velocities on their faces. Column 0 and row 0 are left alone.
    pub fn erase(&mut self, ci: usize, cj: usize, radius: usize) {
        let i_range = ci.saturating_sub(radius).max(1)..square_end(ci, radius).min(self.width);
        let j_range = cj.saturating_sub(radius).max(1)..square_end(cj, radius).min(self.height);
        for i in i_range {
            for j in j_range.clone() {
                let (ii, jj) = (i as isize, j as isize);
                self.s.set(ii, jj, 0.0);
                self.smoke.set(ii, jj, 0.0);
                self.u.set(ii, jj, 0.0);
                self.v.set(ii, jj, 0.0);
                if i + 1 < self.width {
                    self.u.set(ii + 1, jj, 0.0);
                }
                if j + 1 < self.height {
                    self.v.set(ii, jj + 1, 0.0);
                }
            }
        }
    }

    /// Overwrite the face velocities of fluid cells in a square around
    /// `(ci, cj)`. Cells within two cells of the domain edge are skipped.
    pub fn kick(&mut self, ci: usize, cj: usize, radius: usize, du: f32, dv: f32) {
        if self.width < 5 || self.height < 5 {
            return;
        }
        let i_range = ci.saturating_sub(radius).max(2)..square_end(ci, radius).min(self.width - 2);
        let j_range = cj.saturating_sub(radius).max(2)..square_end(cj, radius).min(self.height - 2);
        for i in i_range {
            for j in j_range.clone() {
                if !self.is_fluid(i, j) {
                    continue;
                }
                self.u.set(i as isize, j as isize, du);
                self.v.set(i as isize, j as isize, dv);
            }
        }
    }

    /// First non-finite velocity or pressure value, if any.
    pub fn check_finite(&self) -> Result<(), NumericalError> {
        for kind in [FieldKind::VelocityX, FieldKind::VelocityY, FieldKind::Pressure] {
            let field = self.field(kind);
            if let Some(idx) = field.as_slice().iter().position(|v| !v.is_finite()) {
                return Err(NumericalError::NonFinite {
                    field: kind,
                    i: idx / self.height,
                    j: idx % self.height,
                    value: field.as_slice()[idx],
                });
            }
        }
        Ok(())
    }

    /// Number of open cells.
    pub fn fluid_cells(&self) -> usize {
        self.s.as_slice().iter().filter(|&&s| s != 0.0).count()
    }
}

/// Exclusive end of the span `center - radius ..= center + radius`.
#[inline]
fn square_end(center: usize, radius: usize) -> usize {
    center.saturating_add(radius).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_closes_top_and_bottom_rows() {
        let state = FluidState::new(6, 5, 0.2).unwrap();
        for i in 0..6 {
            assert_eq!(state.mask(i, 0), 0.0);
            assert_eq!(state.mask(i, 4), 0.0);
            for j in 1..4 {
                assert_eq!(state.mask(i, j), 1.0);
            }
        }
        assert!(state.u.as_slice().iter().all(|&v| v == 0.0));
        assert!(state.v.as_slice().iter().all(|&v| v == 0.0));
        assert!(state.p.as_slice().iter().all(|&v| v == 0.0));
        assert!(state.smoke.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(state.fluid_cells(), 18);
    }

    #[test]
    fn test_degenerate_grid_is_rejected() {
        assert!(matches!(
            FluidState::new(5, 0, 1.0),
            Err(ConfigError::InvalidDimensions { width: 5, height: 0 })
        ));
        assert!(FluidState::new(2, 2, 1.0).is_err());
        assert!(matches!(
            FluidState::new(4, 4, 0.0),
            Err(ConfigError::InvalidCellSize(_))
        ));

        let config = SimulationConfig {
            height: 0,
            ..SimulationConfig::default()
        };
        assert!(FluidState::from_config(&config).is_err());
    }

    #[test]
    fn test_set_region_clips_to_grid() {
        let mut state = FluidState::new(6, 6, 1.0).unwrap();
        state.smoke_region(4, 4, 10, 10, 1.0);
        assert_eq!(state.smoke.sum(), 4.0);
        assert_eq!(state.smoke(5, 5), 1.0);
        assert_eq!(state.smoke(3, 5), 0.0);

        state.set_region(9, 9, 2, 2, FieldKind::Smoke, 3.0);
        assert_eq!(state.smoke.sum(), 4.0);
    }

    #[test]
    fn test_mask_stamp_is_binary() {
        let mut state = FluidState::new(6, 6, 1.0).unwrap();
        state.set_region(1, 1, 2, 2, FieldKind::Mask, 0.3);
        assert_eq!(state.mask(1, 1), 0.0);
        state.set_region(1, 1, 1, 1, FieldKind::Mask, 0.7);
        assert_eq!(state.mask(1, 1), 1.0);
        assert!(state.s.as_slice().iter().all(|&s| s == 0.0 || s == 1.0));
    }

    #[test]
    fn test_erase_clears_cells_and_faces() {
        let mut state = FluidState::new(10, 10, 1.0).unwrap();
        state.u.fill(1.0);
        state.v.fill(1.0);
        state.smoke.fill(1.0);

        state.erase(5, 5, 1);
        for i in 4..=6 {
            for j in 4..=6 {
                assert!(!state.is_fluid(i, j));
                assert_eq!(state.smoke(i, j), 0.0);
                assert_eq!(state.u(i, j), 0.0);
                assert_eq!(state.u(i + 1, j), 0.0);
                assert_eq!(state.v(i, j), 0.0);
                assert_eq!(state.v(i, j + 1), 0.0);
            }
        }
        assert!(state.is_fluid(3, 5));
        assert_eq!(state.smoke(3, 5), 1.0);
    }

    #[test]
    fn test_erase_spares_first_column_and_row() {
        let mut state = FluidState::new(8, 8, 1.0).unwrap();
        state.erase(0, 3, 2);
        for j in 1..6 {
            assert!(state.is_fluid(0, j), "column 0 must stay open at row {j}");
            assert!(!state.is_fluid(1, j));
        }
    }

    #[test]
    fn test_kick_skips_solids_and_border() {
        let mut state = FluidState::new(12, 12, 1.0).unwrap();
        state.solidify_region(6, 6, 1, 1);
        state.kick(6, 6, 5, 2.0, -1.0);

        assert_eq!(state.u(6, 6), 0.0);
        assert_eq!(state.u(5, 6), 2.0);
        assert_eq!(state.v(5, 6), -1.0);
        assert_eq!(state.u(1, 6), 0.0);
        assert_eq!(state.u(10, 6), 0.0);
        assert_eq!(state.u(9, 6), 2.0);
    }

    #[test]
    fn test_huge_brush_coordinates_do_not_overflow() {
        let mut state = FluidState::new(8, 8, 0.5).unwrap();
        let before = state.clone();

        state.kick(usize::MAX, usize::MAX, 3, 1.0, 1.0);
        state.kick(3, 3, usize::MAX, 1.0, -1.0);
        assert_eq!(state.u(2, 2), 1.0);
        assert_eq!(state.v(5, 5), -1.0);

        state.erase(usize::MAX, 4, usize::MAX);
        assert!(!state.is_fluid(7, 7));
        assert_eq!(state.mask(0, 4), before.mask(0, 4));
        // Only column 0 (rows 1..=6) survives
        assert_eq!(state.fluid_cells(), 6);
    }

    #[test]
    fn test_divergence_and_cell_velocity() {
        let mut state = FluidState::new(5, 5, 1.0).unwrap();
        state.u.set(2, 2, 1.0);
        state.u.set(3, 2, 3.0);
        state.v.set(2, 2, -1.0);
        state.v.set(2, 3, 1.0);

        assert_eq!(state.divergence(2, 2), 4.0);
        assert_eq!(state.cell_velocity(2, 2), (2.0, 0.0));
        assert_eq!(state.speed(2, 2), 2.0);
    }

    #[test]
    fn test_check_finite_reports_first_bad_cell() {
        let mut state = FluidState::new(5, 5, 1.0).unwrap();
        assert!(state.check_finite().is_ok());

        state.v.set(3, 2, f32::INFINITY);
        match state.check_finite() {
            Err(NumericalError::NonFinite { field, i, j, .. }) => {
                assert_eq!(field, FieldKind::VelocityY);
                assert_eq!((i, j), (3, 2));
            }
            other => panic!("expected non-finite error, got {other:?}"),
        }

        // Marker values are not dynamical and are not checked
        state.v.set(3, 2, 0.0);
        state.smoke.set(1, 1, f32::NAN);
        assert!(state.check_finite().is_ok());
    }
}
