//! WebAssembly bindings for the smoke tunnel.
//!
//! Provides a thin wrapper around `FluidSolver` for browser environments.

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    compute::{FieldKind, FluidSolver, FluidState, FluidStats},
    schema::{Scene, SimulationConfig},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// Browser handle owning a solver and its state.
#[wasm_bindgen]
pub struct WasmFluid {
    solver: FluidSolver,
    state: FluidState,
}

#[wasm_bindgen]
impl WasmFluid {
    /// Create a new simulation from JSON configuration and scene.
    ///
    /// An empty `scene_json` applies the default scene.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, scene_json: &str) -> Result<WasmFluid, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;
        let scene = parse_scene(scene_json)?;

        let solver = FluidSolver::new(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;
        let mut state = FluidState::from_config(solver.config())
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;
        scene.apply(&mut state);

        Ok(WasmFluid { solver, state })
    }

    /// Advance one tick.
    #[wasm_bindgen]
    pub fn step(&mut self) {
        self.solver.tick(&mut self.state);
    }

    /// Advance several ticks.
    #[wasm_bindgen]
    pub fn run(&mut self, ticks: u64) {
        self.solver.run(&mut self.state, ticks);
    }

    /// Get grid metadata as JSON.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let snapshot = StateSnapshot {
            width: self.state.width,
            height: self.state.height,
            cell_size: self.state.cell_size,
            time: self.state.time,
            step: self.state.step,
        };

        serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Get simulation statistics as JSON.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        let stats = FluidStats::from_state(&self.state);
        serde_wasm_bindgen::to_value(&stats)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Copy one field into a typed array.
    ///
    /// Accepts `u`, `v`, `pressure`, `mask` or `smoke` (or `velocity_x` / `velocity_y`).
    #[wasm_bindgen(js_name = getField)]
    pub fn get_field(&self, name: &str) -> Result<Float32Array, JsValue> {
        let kind = parse_field_kind(name)?;
        Ok(Float32Array::from(self.state.field(kind).as_slice()))
    }

    /// Reset the simulation with a new scene.
    #[wasm_bindgen]
    pub fn reset(&mut self, scene_json: &str) -> Result<(), JsValue> {
        let scene = parse_scene(scene_json)?;
        let mut state = FluidState::from_config(self.solver.config())
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;
        scene.apply(&mut state);
        self.state = state;
        Ok(())
    }

    /// Write `value` into a rectangle of one field.
    #[wasm_bindgen(js_name = setRegion)]
    pub fn set_region(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        target: &str,
        value: f32,
    ) -> Result<(), JsValue> {
        let kind = parse_field_kind(target)?;
        self.state.set_region(x, y, width, height, kind, value);
        Ok(())
    }

    /// Turn a square of cells around `(i, j)` solid.
    #[wasm_bindgen]
    pub fn erase(&mut self, i: usize, j: usize, radius: usize) {
        self.state.erase(i, j, radius);
    }

    /// Set the velocity of fluid cells in a square around `(i, j)`.
    #[wasm_bindgen]
    pub fn kick(&mut self, i: usize, j: usize, radius: usize, du: f32, dv: f32) {
        self.state.kick(i, j, radius, du, dv);
    }

    /// Get current simulation time.
    #[wasm_bindgen(js_name = getTime)]
    pub fn get_time(&self) -> f32 {
        self.state.time
    }

    /// Get current tick count.
    #[wasm_bindgen(js_name = getStep)]
    pub fn get_step(&self) -> u64 {
        self.state.step
    }

    /// Get grid width.
    #[wasm_bindgen(js_name = getWidth)]
    pub fn get_width(&self) -> usize {
        self.state.width
    }

    /// Get grid height.
    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self) -> usize {
        self.state.height
    }
}

/// Serializable grid metadata.
#[derive(Serialize)]
struct StateSnapshot {
    width: usize,
    height: usize,
    cell_size: f32,
    time: f32,
    step: u64,
}

fn parse_scene(scene_json: &str) -> Result<Scene, JsValue> {
    if scene_json.trim().is_empty() {
        return Ok(Scene::default());
    }
    serde_json::from_str(scene_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid scene JSON: {e}")))
}

fn parse_field_kind(name: &str) -> Result<FieldKind, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_owned()))
        .map_err(|_| JsValue::from_str(&format!("Unknown field: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    const CONFIG: &str = r#"{"width": 16, "height": 12, "cell_size": 0.0625}"#;

    #[wasm_bindgen_test]
    fn test_step_advances_time() {
        let mut fluid = WasmFluid::new(CONFIG, "").unwrap();
        fluid.run(3);
        assert_eq!(fluid.get_step(), 3);
        assert!(fluid.get_time() > 0.0);
    }

    #[wasm_bindgen_test]
    fn test_field_snapshot_length() {
        let fluid = WasmFluid::new(CONFIG, r#"{"stamps": []}"#).unwrap();
        let smoke = fluid.get_field("smoke").unwrap();
        assert_eq!(smoke.length() as usize, 16 * 12);
        assert!(fluid.get_field("vorticity").is_err());
    }

    #[wasm_bindgen_test]
    fn test_degenerate_grid_is_an_error() {
        let config = r#"{"width": 5, "height": 0, "cell_size": 0.1}"#;
        assert!(WasmFluid::new(config, "").is_err());
    }

    #[wasm_bindgen_test]
    fn test_set_region_parses_target() {
        let mut fluid = WasmFluid::new(CONFIG, r#"{"stamps": []}"#).unwrap();
        fluid.set_region(4, 4, 2, 2, "mask", 0.0).unwrap();
        assert!(!fluid.state.is_fluid(4, 4));
        assert!(fluid.set_region(0, 0, 1, 1, "density", 1.0).is_err());
    }
}
