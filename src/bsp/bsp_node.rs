//! src/bsp/bsp_node.rs

use crate::bsp::SplitKind;
use crate::utils::geometry::Rect;

/// A node in the BSP tree. Each node has:
/// - The rectangular region `rect` it covers.
/// - A `split` kind (`SplitKind::None` for leaves).
/// - Exactly zero or two exclusively owned children; once created they are
///   never reassigned or removed.
/// - A carved `room`, present on leaves only after the carve pass has run.
#[derive(Debug)]
pub struct Node {
    pub rect: Rect,
    pub split: SplitKind,
    pub room: Option<Rect>,
    /// Set when the room search hit the retry cap and kept an undersized
    /// sample. Diagnostic only; the room value itself is untouched.
    pub room_degraded: bool,
    pub kids: Option<[Box<Node>; 2]>,
}

impl Node {
    /// Create an unsplit node covering `rect`.
    pub fn new(rect: Rect) -> Self {
        Node {
            rect,
            split: SplitKind::None,
            room: None,
            room_degraded: false,
            kids: None,
        }
    }

    /// Returns `true` if `self` is a leaf (i.e. was never split).
    pub fn is_leaf(&self) -> bool {
        self.split == SplitKind::None
    }
}
