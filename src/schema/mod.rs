//! Schema module - Configuration and scene types for fluid simulations.

mod config;
mod scene;

pub use config::*;
pub use scene::*;
