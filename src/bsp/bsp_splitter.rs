// src/bsp/bsp_splitter.rs
// Region partitioning pass: grows the tree from the root region down to
// leaves, using an explicit worklist instead of call-stack recursion.

use log::debug;

use crate::bsp::bsp_node::Node;
use crate::bsp::{SplitKind, MAX_SAMPLE_ATTEMPTS};
use crate::utils::geometry::{Extent, Rect};
use crate::utils::rng::RandomSource;

pub(crate) struct Splitter<'a> {
    rng: &'a mut RandomSource,
    split_threshold: Extent,
    min_leaf_size: Extent,
    /// Splits that kept an undersized position after the retry cap.
    pub(crate) degraded_splits: usize,
}

impl<'a> Splitter<'a> {
    pub fn new(
        rng: &'a mut RandomSource,
        split_threshold: Extent,
        min_leaf_size: Extent,
    ) -> Self {
        Splitter {
            rng,
            split_threshold,
            min_leaf_size,
            degraded_splits: 0,
        }
    }

    /// Builds the tree for `area`, or returns `None` when the area does not
    /// exceed the split threshold on either axis. No root means no leaves
    /// and, later, no rooms.
    pub fn build(&mut self, area: Extent) -> Option<Node> {
        if !(self.split_threshold.x < area.x || self.split_threshold.y < area.y) {
            debug!(
                "area {}x{} does not exceed the split threshold, tree stays empty",
                area.x, area.y
            );
            return None;
        }

        let mut root = Node::new(Rect::new(0.0, 0.0, area.x, area.y));
        // Depth-first, first child before second, so the draw sequence per
        // subtree matches plain recursion.
        let mut pending: Vec<&mut Node> = vec![&mut root];
        while let Some(node) = pending.pop() {
            self.split_node(node);
            if let Some([first, second]) = node.kids.as_mut() {
                pending.push(second);
                pending.push(first);
            }
        }
        Some(root)
    }

    fn split_node(&mut self, node: &mut Node) {
        let w = node.rect.width();
        let h = node.rect.height();
        let can_split_x = w >= self.split_threshold.x;
        let can_split_y = h >= self.split_threshold.y;

        node.split = match (can_split_x, can_split_y) {
            (true, true) => {
                if self.rng.coin_flip() {
                    SplitKind::Horizontal
                } else {
                    SplitKind::Vertical
                }
            }
            (true, false) => SplitKind::Horizontal,
            (false, true) => SplitKind::Vertical,
            (false, false) => return, // Leaf; nothing to partition.
        };

        // Search for a position that keeps the smaller half at or above the
        // minimum leaf size. Past the cap the last sample is kept, which can
        // leave an undersized child.
        let (len, min_child) = if node.split == SplitKind::Horizontal {
            (w, self.min_leaf_size.x)
        } else {
            (h, self.min_leaf_size.y)
        };
        let (pos, accepted) = self.rng.sample_until(
            MAX_SAMPLE_ATTEMPTS,
            |rng| rng.uniform(),
            |&pos: &f64| len * pos.min(1.0 - pos) >= min_child,
        );
        if !accepted {
            self.degraded_splits += 1;
        }

        let r = node.rect;
        node.kids = Some(if node.split == SplitKind::Horizontal {
            let mid = r.xmin + (r.xmax - r.xmin) * pos;
            [
                Box::new(Node::new(Rect::new(r.xmin, r.ymin, mid, r.ymax))),
                Box::new(Node::new(Rect::new(mid, r.ymin, r.xmax, r.ymax))),
            ]
        } else {
            let mid = r.ymin + (r.ymax - r.ymin) * pos;
            [
                Box::new(Node::new(Rect::new(r.xmin, r.ymin, r.xmax, mid))),
                Box::new(Node::new(Rect::new(r.xmin, mid, r.xmax, r.ymax))),
            ]
        });
    }
}
