//! Smoke tunnel CLI - Run simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use smoke_tunnel::{
    compute::{FluidSolver, FluidState, FluidStats},
    schema::{Scene, SimulationConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [ticks]", args[0]);
        eprintln!();
        eprintln!("Run a wind-tunnel simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  ticks        Number of simulation ticks (default: 100)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let ticks: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    let config = SimulationConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    // Load or create scene
    let scene_path = config_path.with_extension("scene.json");
    let scene: Scene = if scene_path.exists() {
        let scene_str = fs::read_to_string(&scene_path).unwrap_or_else(|e| {
            eprintln!("Error reading scene file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&scene_str).unwrap_or_else(|e| {
            eprintln!("Error parsing scene: {}", e);
            std::process::exit(1);
        })
    } else {
        Scene::default()
    };

    println!("Smoke Tunnel Simulation");
    println!("=======================");
    println!(
        "Grid: {}x{} (h = {})",
        config.width, config.height, config.cell_size
    );
    println!(
        "dt: {}, iterations: {}, omega: {}",
        config.dt, config.iterations, config.over_relaxation
    );
    println!("Stamps: {}", scene.stamps.len());
    println!("Ticks: {}", ticks);
    println!();

    let mut state = FluidState::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });
    scene.apply(&mut state);
    let initial_stats = FluidStats::from_state(&state);

    println!("Initial state:");
    println!("  Fluid cells: {}", initial_stats.fluid_cells);
    println!("  Total smoke: {:.6}", initial_stats.total_smoke);
    println!();

    let mut solver = FluidSolver::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..ticks {
        solver.tick(&mut state);

        // Print progress every 10%
        if (i + 1) % (ticks / 10).max(1) == 0 {
            let stats = FluidStats::from_state(&state);
            let elapsed = start.elapsed().as_secs_f32();
            let ticks_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Tick {}/{}: max|u|={:.4}, p=[{:.2}, {:.2}], div={:.2e}, {:.1} ticks/s",
                i + 1,
                ticks,
                stats.max_speed,
                stats.min_pressure,
                stats.max_pressure,
                stats.max_divergence,
                ticks_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = FluidStats::from_state(&state);

    println!();
    println!("Final state:");
    println!("  Time: {:.4}s simulated", state.time);
    println!("  Max speed: {:.6}", final_stats.max_speed);
    println!(
        "  Pressure range: [{:.6}, {:.6}]",
        final_stats.min_pressure, final_stats.max_pressure
    );
    println!("  Max divergence: {:.3e}", final_stats.max_divergence);
    println!("  Total smoke: {:.6}", final_stats.total_smoke);
    if final_stats.non_finite > 0 {
        println!("  Non-finite values: {}", final_stats.non_finite);
    }
    println!();
    println!(
        "Time: {:.2}s ({:.1} ticks/s)",
        elapsed.as_secs_f32(),
        ticks as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let scene = Scene::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example scene (config.scene.json):");
    println!("{}", serde_json::to_string_pretty(&scene).unwrap());
}
