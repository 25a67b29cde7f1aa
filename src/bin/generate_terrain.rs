//! Terrain generator binary: composes one terrain and writes it to disk.
//!
//! Usage: cargo run --release --bin generate_terrain -- [OPTIONS]
//!
//! Options:
//!   --params <FILE>   TerrainParams JSON (default: built-in defaults)
//!   --out <DIR>       Output directory (default: "terrain_out")
//!   --seed <SEED>     Override the params seed
//!   --size <N>        Override width and height
//!
//! Output structure:
//!   <out>/
//!     heights.png     # Normalized heights, 8-bit grayscale
//!     paths.png       # Path layer mask
//!     wetness.png     # Hydrology wetness
//!     summary.json    # Sizes, water level, placement counts

use std::path::PathBuf;
use std::time::Instant;

use terrasculpt::core::Result;
use terrasculpt::export;
use terrasculpt::generation::{TerrainComposer, TerrainParams};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    if let Err(e) = run() {
        log::error!("Terrain generation failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let params_path = parse_str_arg(&args, "--params");
    let out_dir = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "terrain_out".to_string()));
    let seed = parse_u64_arg(&args, "--seed");
    let size = parse_usize_arg(&args, "--size");

    let mut params = match &params_path {
        Some(path) => TerrainParams::load(path)?,
        None => TerrainParams::default(),
    };
    if let Some(seed) = seed {
        params.seed = seed;
    }
    if let Some(size) = size {
        params.width = size;
        params.height = size;
    }

    println!("=== Terrasculpt Terrain Generator ===");
    println!("Params: {}", params_path.as_deref().unwrap_or("<defaults>"));
    println!("Size:   {} x {} (depth {})", params.width, params.height, params.depth);
    println!("Seed:   {}", params.seed);
    println!("Water:  {} features, Paths: {}, Vegetation layers: {}",
        params.water.len(), params.paths.len(), params.vegetation.len());
    println!("Output: {}", out_dir.display());
    println!();

    let start = Instant::now();
    let composer = TerrainComposer::new(params)?;
    let composed = composer.compose()?;

    std::fs::create_dir_all(&out_dir)?;
    export::write_grayscale(&composed.heights, out_dir.join("heights.png"))?;
    export::write_layer_mask(&composed.path_mask, out_dir.join("paths.png"))?;
    export::write_grayscale(&composed.wetness, out_dir.join("wetness.png"))?;
    export::write_summary(&composed, out_dir.join("summary.json"))?;

    println!("Placements: {}", composed.placements.len());
    println!("Rivers:     {} ({} bank props)", composed.rivers.len(), composed.bank_props.len());
    println!("Done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
