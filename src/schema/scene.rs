//! Scene types for authoring obstacles and marker before a run.

use serde::{Deserialize, Serialize};

use crate::compute::{FieldKind, FluidState};

/// Ordered list of stamps applied to a fresh state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub stamps: Vec<Stamp>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            stamps: vec![Stamp::SolidDisc {
                center: (0.25, 0.5),
                radius: 0.08,
            }],
        }
    }
}

/// A single authoring operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stamp {
    /// Write `value` into a rectangle of any field.
    Region {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        target: FieldKind,
        value: f32,
    },
    /// Solid rectangle.
    Solid {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// Marker rectangle.
    Smoke {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        #[serde(default = "default_smoke")]
        value: f32,
    },
    /// Solid disc.
    SolidDisc {
        /// Center position as fraction of grid size (0.0-1.0).
        center: (f32, f32),
        /// Radius as fraction of the smaller grid dimension.
        radius: f32,
    },
}

fn default_smoke() -> f32 {
    1.0
}

impl Scene {
    /// An empty scene.
    pub fn empty() -> Self {
        Self { stamps: Vec::new() }
    }

    /// Apply every stamp in order.
    pub fn apply(&self, state: &mut FluidState) {
        for stamp in &self.stamps {
            log::debug!("applying {:?}", stamp);
            stamp.apply(state);
        }
    }
}

impl Stamp {
    pub fn apply(&self, state: &mut FluidState) {
        match *self {
            Stamp::Region {
                x,
                y,
                width,
                height,
                target,
                value,
            } => state.set_region(x, y, width, height, target, value),
            Stamp::Solid {
                x,
                y,
                width,
                height,
            } => state.solidify_region(x, y, width, height),
            Stamp::Smoke {
                x,
                y,
                width,
                height,
                value,
            } => state.smoke_region(x, y, width, height, value),
            Stamp::SolidDisc { center, radius } => apply_disc(state, center, radius),
        }
    }
}

fn apply_disc(state: &mut FluidState, center: (f32, f32), radius: f32) {
    let cx = center.0 * state.width as f32;
    let cy = center.1 * state.height as f32;
    let r = radius * state.width.min(state.height) as f32;
    let r_sq = r * r;

    for i in 0..state.width {
        for j in 0..state.height {
            let dx = i as f32 + 0.5 - cx;
            let dy = j as f32 + 0.5 - cy;
            if dx * dx + dy * dy < r_sq {
                state.solidify_region(i, j, 1, 1);
            }
        }
    }
}
