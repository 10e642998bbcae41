//! Life Patterns CLI - Run simulations from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use life_patterns::{
    compute::{Simulation, SimulationStats},
    schema::{PatternLibrary, Seed, SimulationConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps]", args[0]);
        eprintln!();
        eprintln!("Run a Game of Life simulation with pattern recognition.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  steps        Number of generations (default: 100)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let steps: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load or create seed
    let seed_path = config_path.with_extension("seed.json");
    let seed: Seed = if seed_path.exists() {
        let seed_str = fs::read_to_string(&seed_path).unwrap_or_else(|e| {
            eprintln!("Error reading seed file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&seed_str).unwrap_or_else(|e| {
            eprintln!("Error parsing seed: {}", e);
            std::process::exit(1);
        })
    } else {
        Seed::default()
    };

    let library = PatternLibrary::builtin().unwrap_or_else(|e| {
        eprintln!("Error loading pattern library: {}", e);
        std::process::exit(1);
    });

    println!("Life Patterns Simulation");
    println!("========================");
    println!("Grid: {}x{}", config.width, config.height);
    println!(
        "Patterns: {}",
        library
            .iter()
            .map(|entry| entry.pattern.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Scanning: {}",
        if config.scan.enabled { "on" } else { "off" }
    );
    println!("Cadence: {} ticks/s", config.ticks_per_second);
    println!("Steps: {}", steps);
    println!();

    let budget = config.tick_interval();

    // Initialize
    let mut sim = Simulation::new(config, &seed, library).unwrap_or_else(|e| {
        eprintln!("Error initializing simulation: {}", e);
        std::process::exit(1);
    });

    println!("Initial state:");
    println!("  Population: {}", sim.grid().population());
    println!();

    // Run simulation
    println!("Running simulation...");
    let start = Instant::now();
    let mut overruns = 0u64;
    let progress_every = (steps / 10).max(1);

    for i in 0..steps {
        let tick_start = Instant::now();
        let frame = sim.tick();
        if tick_start.elapsed() > budget {
            overruns += 1;
        }

        // Print progress every 10%
        if (i + 1) % progress_every == 0 {
            let stats = SimulationStats::from_frame(&frame);
            let elapsed = start.elapsed().as_secs_f32();
            let steps_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Generation {}/{}: population={}, patterns={}, {:.1} steps/s",
                i + 1,
                steps,
                stats.population,
                stats.total_instances(),
                steps_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = SimulationStats::from_frame(&sim.frame());

    println!();
    println!("Final state:");
    println!("  Generation: {}", final_stats.generation);
    println!("  Population: {}", final_stats.population);
    println!("  Marked cells: {}", final_stats.marked_cells);
    for pattern in final_stats.instances.iter().filter(|p| p.count > 0) {
        println!("  {}: {}", pattern.name, pattern.count);
    }
    println!();
    println!(
        "Ticks over budget ({:.2}ms): {}/{}",
        budget.as_secs_f64() * 1000.0,
        overruns,
        steps
    );
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let seed = Seed::default();

    let (Ok(config_json), Ok(seed_json)) = (
        serde_json::to_string_pretty(&config),
        serde_json::to_string_pretty(&seed),
    ) else {
        eprintln!("Error serializing example configuration");
        std::process::exit(1);
    };

    println!("Example configuration (config.json):");
    println!("{}", config_json);
    println!();
    println!("Example seed (config.seed.json):");
    println!("{}", seed_json);
}
