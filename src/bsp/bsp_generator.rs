// src/bsp/bsp_generator.rs

use std::collections::VecDeque;
use std::time::Instant;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bsp::bsp_carver::Carver;
use crate::bsp::bsp_node::Node;
use crate::bsp::bsp_splitter::Splitter;
use crate::utils::geometry::{Extent, Rect};
use crate::utils::rng::RandomSource;

/// Parameters for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Total area to partition, anchored at the origin.
    pub area: Extent,
    /// Region extent required before a split along that axis is attempted.
    pub split_threshold: Extent,
    /// Smallest acceptable sub-region produced by a split. Carved rooms may
    /// be as small as half of this.
    pub min_leaf_size: Extent,
    pub seed: u32,
}

impl GeneratorConfig {
    /// All extents must be strictly positive; anything else would feed
    /// degenerate geometry into the split and carve searches.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        for (name, extent) in [
            ("area", self.area),
            ("split_threshold", self.split_threshold),
            ("min_leaf_size", self.min_leaf_size),
        ] {
            if !extent.is_positive() {
                return Err(GeneratorError::InvalidExtent {
                    name,
                    x: extent.x,
                    y: extent.y,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeneratorError {
    #[error("{name} components must be strictly positive, got ({x}, {y})")]
    InvalidExtent {
        name: &'static str,
        x: f64,
        y: f64,
    },
}

#[derive(Default, Debug, Clone)]
pub struct GenerationStats {
    /// Wall-clock seconds spent building and carving the tree.
    pub generation_time: f64,
    pub node_count: usize,
    pub room_count: usize,
    pub degraded_split_count: usize,
    pub degraded_room_count: usize,
}

/// One generated dungeon layout: the BSP tree plus the configuration that
/// produced it. The tree is split once, carved once, and read-only for all
/// queries afterwards.
#[derive(Debug)]
pub struct BspDungeon {
    config: GeneratorConfig,
    root: Option<Node>,
    stats: GenerationStats,
}

impl BspDungeon {
    /// Runs the split pass and then the carve pass over `config.area`.
    pub fn generate(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        let started = Instant::now();
        let mut rng = RandomSource::from_seed(config.seed);

        let mut splitter = Splitter::new(&mut rng, config.split_threshold, config.min_leaf_size);
        let mut root = splitter.build(config.area);
        let degraded_split_count = splitter.degraded_splits;

        // Rooms may be half as small as the leaves that contain them.
        let mut carver = Carver::new(&mut rng, config.min_leaf_size.halved());
        if let Some(root) = root.as_mut() {
            carver.carve(root);
        }
        let degraded_room_count = carver.degraded_rooms;

        let (node_count, room_count) = count_nodes(root.as_ref());
        let stats = GenerationStats {
            generation_time: started.elapsed().as_secs_f64(),
            node_count,
            room_count,
            degraded_split_count,
            degraded_room_count,
        };
        info!(
            "generated {} rooms over {} nodes in {:.3}ms (seed {})",
            stats.room_count,
            stats.node_count,
            stats.generation_time * 1000.0,
            config.seed
        );
        Ok(BspDungeon {
            config,
            root,
            stats,
        })
    }

    /// All carved rooms in breadth-first order. Empty when the requested
    /// area never exceeded the split threshold and no tree was built.
    pub fn all_rooms(&self) -> Vec<Rect> {
        self.collect_leaves(|node| node.room)
    }

    /// The leaf regions, in the same order as `all_rooms`. Together they
    /// tile the whole requested area without overlap.
    pub fn leaf_rects(&self) -> Vec<Rect> {
        self.collect_leaves(|node| Some(node.rect))
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    fn collect_leaves(&self, mut pick: impl FnMut(&Node) -> Option<Rect>) -> Vec<Rect> {
        let mut out = Vec::new();
        let Some(root) = self.root.as_ref() else {
            return out;
        };
        let mut pending: VecDeque<&Node> = VecDeque::new();
        pending.push_back(root);
        while let Some(node) = pending.pop_front() {
            if node.is_leaf() {
                out.extend(pick(node));
            } else if let Some([first, second]) = node.kids.as_ref() {
                pending.push_back(first);
                pending.push_back(second);
            }
        }
        out
    }
}

/// Generates every config as an independent run. Each run owns its random
/// source, so the runs are data-parallel and individually reproducible.
pub fn generate_batch(configs: Vec<GeneratorConfig>) -> Result<Vec<BspDungeon>, GeneratorError> {
    configs
        .into_par_iter()
        .map(BspDungeon::generate)
        .collect()
}

fn count_nodes(root: Option<&Node>) -> (usize, usize) {
    let mut nodes = 0;
    let mut leaves = 0;
    let mut pending: Vec<&Node> = root.into_iter().collect();
    while let Some(node) = pending.pop() {
        nodes += 1;
        if node.is_leaf() {
            leaves += 1;
        } else if let Some([first, second]) = node.kids.as_ref() {
            pending.push(first);
            pending.push(second);
        }
    }
    (nodes, leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn scenario_a() -> GeneratorConfig {
        GeneratorConfig {
            area: Extent::new(100.0, 100.0),
            split_threshold: Extent::new(40.0, 40.0),
            min_leaf_size: Extent::new(10.0, 10.0),
            seed: 42,
        }
    }

    fn scenario_c(seed: u32) -> GeneratorConfig {
        GeneratorConfig {
            area: Extent::new(1000.0, 1000.0),
            split_threshold: Extent::new(50.0, 50.0),
            min_leaf_size: Extent::new(20.0, 20.0),
            seed,
        }
    }

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let first = BspDungeon::generate(scenario_a()).unwrap();
        let second = BspDungeon::generate(scenario_a()).unwrap();
        assert_eq!(first.all_rooms(), second.all_rooms());
        assert_eq!(first.leaf_rects(), second.leaf_rects());
    }

    #[test]
    fn test_rooms_stay_within_the_requested_area() {
        let dungeon = BspDungeon::generate(scenario_a()).unwrap();
        let rooms = dungeon.all_rooms();
        assert!(!rooms.is_empty());
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        for room in rooms {
            assert!(room.xmin <= room.xmax);
            assert!(room.ymin <= room.ymax);
            assert!(bounds.contains(&room));
        }
    }

    #[test]
    fn test_undersized_area_yields_no_rooms() {
        let dungeon = BspDungeon::generate(GeneratorConfig {
            area: Extent::new(10.0, 10.0),
            split_threshold: Extent::new(40.0, 40.0),
            min_leaf_size: Extent::new(5.0, 5.0),
            seed: 7,
        })
        .unwrap();
        assert!(dungeon.root().is_none());
        assert!(dungeon.all_rooms().is_empty());
        assert_eq!(dungeon.stats().room_count, 0);
        assert_eq!(dungeon.stats().node_count, 0);
    }

    #[test]
    fn test_distinct_seeds_disagree_but_both_hold_the_invariants() {
        let a = BspDungeon::generate(scenario_c(1)).unwrap();
        let b = BspDungeon::generate(scenario_c(2)).unwrap();
        assert_ne!(a.all_rooms(), b.all_rooms());

        for dungeon in [&a, &b] {
            let rooms = dungeon.all_rooms();
            let leaves = dungeon.leaf_rects();
            assert_eq!(rooms.len(), leaves.len());
            for (room, leaf) in rooms.iter().zip(&leaves) {
                assert!(leaf.contains(room));
            }
        }
    }

    #[test]
    fn test_leaves_tile_the_area_without_overlap() {
        let dungeon = BspDungeon::generate(scenario_c(3)).unwrap();
        let leaves = dungeon.leaf_rects();

        let total: f64 = leaves.iter().map(Rect::area).sum();
        assert_approx_eq!(total, 1000.0 * 1000.0, 1e-3);

        let bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        for leaf in &leaves {
            assert!(bounds.contains(leaf));
        }
        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                assert!(!a.overlaps(b), "leaves {a:?} and {b:?} overlap");
            }
        }
    }

    #[test]
    fn test_room_and_leaf_counts_line_up() {
        let dungeon = BspDungeon::generate(scenario_a()).unwrap();
        let stats = dungeon.stats();
        assert_eq!(dungeon.all_rooms().len(), stats.room_count);
        assert_eq!(dungeon.leaf_rects().len(), stats.room_count);
        // A full binary tree: two children per internal node.
        assert_eq!(stats.node_count, 2 * stats.room_count - 1);
    }

    #[test]
    fn test_room_size_compliance_across_seeds() {
        // min_room is half of min_leaf_size, so (10, 10) here.
        let mut total = 0usize;
        let mut compliant = 0usize;
        for seed in 0..20 {
            let dungeon = BspDungeon::generate(scenario_c(seed)).unwrap();
            assert_eq!(dungeon.stats().degraded_split_count, 0);
            assert_eq!(dungeon.stats().degraded_room_count, 0);
            for room in dungeon.all_rooms() {
                total += 1;
                if room.width() >= 10.0 && room.height() >= 10.0 {
                    compliant += 1;
                }
            }
        }
        assert!(total > 0);
        assert!(compliant as f64 >= total as f64 * 0.99);
    }

    #[test]
    fn test_rejects_non_positive_extents() {
        let mut config = scenario_a();
        config.area = Extent::new(0.0, 100.0);
        assert_eq!(
            BspDungeon::generate(config).unwrap_err(),
            GeneratorError::InvalidExtent {
                name: "area",
                x: 0.0,
                y: 100.0
            }
        );

        let mut config = scenario_a();
        config.min_leaf_size = Extent::new(10.0, -1.0);
        assert!(matches!(
            BspDungeon::generate(config),
            Err(GeneratorError::InvalidExtent {
                name: "min_leaf_size",
                ..
            })
        ));
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let configs: Vec<GeneratorConfig> = (0..4).map(scenario_c).collect();
        let batch = generate_batch(configs.clone()).unwrap();
        for (config, dungeon) in configs.into_iter().zip(&batch) {
            let sequential = BspDungeon::generate(config).unwrap();
            assert_eq!(sequential.all_rooms(), dungeon.all_rooms());
        }
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = scenario_a();
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
