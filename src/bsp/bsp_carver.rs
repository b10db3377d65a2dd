// src/bsp/bsp_carver.rs
// Room placement pass: walks the finished tree and carves one randomly
// sized room inside every leaf region.

use std::collections::VecDeque;

use crate::bsp::bsp_node::Node;
use crate::bsp::MAX_SAMPLE_ATTEMPTS;
use crate::utils::geometry::{Extent, Rect};
use crate::utils::rng::RandomSource;

pub(crate) struct Carver<'a> {
    rng: &'a mut RandomSource,
    min_room_size: Extent,
    /// Rooms that kept an undersized sample after the retry cap.
    pub(crate) degraded_rooms: usize,
}

impl<'a> Carver<'a> {
    pub fn new(rng: &'a mut RandomSource, min_room_size: Extent) -> Self {
        Carver {
            rng,
            min_room_size,
            degraded_rooms: 0,
        }
    }

    pub fn carve(&mut self, root: &mut Node) {
        let mut pending: VecDeque<&mut Node> = VecDeque::new();
        pending.push_back(root);
        while let Some(node) = pending.pop_front() {
            if node.is_leaf() {
                self.carve_leaf(node);
            } else if let Some([first, second]) = node.kids.as_mut() {
                pending.push_back(first);
                pending.push_back(second);
            }
        }
    }

    /// The chained draws keep the room inside the leaf by construction:
    /// each edge is sampled within whatever span the previous draws left.
    fn carve_leaf(&mut self, node: &mut Node) {
        let rect = node.rect;
        let min_room = self.min_room_size;
        let (room, accepted) = self.rng.sample_until(
            MAX_SAMPLE_ATTEMPTS,
            |rng| {
                let xmin = rect.xmin + rect.width() * rng.uniform();
                let xmax = xmin + (rect.xmax - xmin) * rng.uniform();
                let ymin = rect.ymin + rect.height() * rng.uniform();
                let ymax = ymin + (rect.ymax - ymin) * rng.uniform();
                Rect::new(xmin, ymin, xmax, ymax)
            },
            |room| room.width() >= min_room.x && room.height() >= min_room.y,
        );
        if !accepted {
            self.degraded_rooms += 1;
        }
        node.room = Some(room);
        node.room_degraded = !accepted;
    }
}
