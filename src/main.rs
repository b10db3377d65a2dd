//! # dungen Demo Entry Point
//!
//! Generates a single dungeon layout and prints the carved room rectangles
//! as JSON, so the output can be piped straight into a content pipeline.
//! Usage: `dungen [width height seed]`.

use std::env;
use std::error::Error;

use log::info;

use dungen::bsp::{BspDungeon, GeneratorConfig};
use dungen::utils::geometry::Extent;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging.
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (width, height, seed) = match args.as_slice() {
        [] => (100.0, 100.0, 42),
        [w, h, s] => (w.parse()?, h.parse()?, s.parse()?),
        _ => return Err("usage: dungen [width height seed]".into()),
    };

    let config = GeneratorConfig {
        area: Extent::new(width, height),
        split_threshold: Extent::new(width * 0.4, height * 0.4),
        min_leaf_size: Extent::new(width * 0.1, height * 0.1),
        seed,
    };
    info!("generating a {}x{} layout with seed {}", width, height, seed);

    let dungeon = BspDungeon::generate(config)?;
    println!("{}", serde_json::to_string_pretty(&dungeon.all_rooms())?);
    Ok(())
}
