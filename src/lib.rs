//! Smoke tunnel - Incompressible 2D flow on a staggered grid.
//!
//! This crate provides a small Eulerian fluid solver in the style of a wind
//! tunnel: constant inflow on the left, open outflow on the right, solid
//! obstacles painted into a cell mask and a passive marker ("smoke") that
//! visualises the flow.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and scene types
//! - `compute`: Numerical computation (sampling, projection, boundaries, advection)
//!
//! # Example
//!
//! ```rust,no_run
//! use smoke_tunnel::{
//!     compute::{FluidSolver, FluidState, FluidStats},
//!     schema::{Scene, SimulationConfig},
//! };
//!
//! let config = SimulationConfig::default();
//!
//! // Paint the default obstacle into a fresh state
//! let mut state = FluidState::from_config(&config).expect("valid configuration");
//! Scene::default().apply(&mut state);
//!
//! let mut solver = FluidSolver::new(config).expect("valid configuration");
//! solver.run(&mut state, 100);
//!
//! let stats = FluidStats::from_state(&state);
//! println!("max speed after 100 ticks: {}", stats.max_speed);
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{FluidSolver, FluidState, FluidStats};
pub use schema::{Scene, SimulationConfig, Stamp};
