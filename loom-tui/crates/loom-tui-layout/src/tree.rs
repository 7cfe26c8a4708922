//! Per-frame layout output.

use loom_tui_core::Rect;

/// Absolute rectangles mirroring the laid-out node tree.
///
/// Children appear in source order with holes skipped. Grid children beyond an
/// explicit grid's capacity are not laid out and have no entry, so the entries
/// always form a prefix of the node's present children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutTree {
    /// The node's absolute rectangle.
    pub rect: Rect,
    /// Child layouts.
    pub children: Vec<LayoutTree>,
}

impl LayoutTree {
    /// Creates a leaf layout.
    pub const fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            children: Vec::new(),
        }
    }

    /// Counts this node and all descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Follows a path of child indices from this node.
    pub fn descendant(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Visits every rectangle in pre-order.
    pub fn for_each_rect(&self, mut f: impl FnMut(Rect)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            f(node.rect);
            stack.extend(node.children.iter().rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_and_count() {
        let tree = LayoutTree {
            rect: Rect::new(0, 0, 10, 10),
            children: vec![
                LayoutTree::leaf(Rect::new(0, 0, 5, 1)),
                LayoutTree {
                    rect: Rect::new(0, 1, 5, 5),
                    children: vec![LayoutTree::leaf(Rect::new(1, 2, 1, 1))],
                },
            ],
        };
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.descendant(&[1, 0]).map(|n| n.rect), Some(Rect::new(1, 2, 1, 1)));
        assert!(tree.descendant(&[2]).is_none());

        let mut seen = Vec::new();
        tree.for_each_rect(|r| seen.push(r.y));
        assert_eq!(seen, vec![0, 0, 1, 2]);
    }
}
