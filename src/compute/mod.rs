//! Compute module - Numerical core of the staggered-grid solver.

mod advection;
mod boundary;
mod field;
mod projection;
mod solver;
mod state;

pub use advection::*;
pub use boundary::*;
pub use field::*;
pub use projection::*;
pub use solver::*;
pub use state::*;
