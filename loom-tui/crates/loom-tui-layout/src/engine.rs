//! Layout engine: measurement, placement and the per-pass measure cache.

use ahash::AHashMap;
use loom_tui_core::{ErrorCode, Fatal, Rect, Result, Size, VNode, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::tree::LayoutTree;
use crate::{flex, grid, leaf};

/// Layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum nesting depth measured or laid out before `DEPTH_LIMIT`.
    pub max_depth: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Counters for the most recent pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Measurements actually computed.
    pub measured: u64,
    /// Measurements answered from the cache.
    pub cache_hits: u64,
}

/// Measure cache key.
///
/// Nodes are identified by address, which is only stable while the borrowed
/// tree is alive, so the cache is cleared at the start of every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MeasureKey {
    node: usize,
    max_w: i32,
    max_h: i32,
    axis: Axis,
}

/// Computes sizes and absolute rectangles for `VNode` trees.
///
/// Every public entry point is one pass: measurements of the same node under
/// the same constraints are computed once per pass, which keeps a parent's
/// measure followed by its layout from re-measuring the whole subtree.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    cache: AHashMap<MeasureKey, Size>,
    stats: LayoutStats,
}

impl LayoutEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Returns counters for the most recent pass.
    pub const fn stats(&self) -> LayoutStats {
        self.stats
    }

    /// Measures `node` within `max_w` x `max_h` cells.
    ///
    /// `axis` is the main axis of the node's nearest flex ancestor. The result
    /// never exceeds the constraints.
    pub fn measure(&mut self, node: &VNode, max_w: i32, max_h: i32, axis: Axis) -> Result<Size> {
        self.begin_pass();
        let size = self.measure_node(node, max_w, max_h, axis, 0);
        self.end_pass("measure", &size);
        size
    }

    /// Measures `node` within the constraints and lays it out at (`x`, `y`).
    pub fn layout(
        &mut self,
        node: &VNode,
        x: i32,
        y: i32,
        max_w: i32,
        max_h: i32,
        axis: Axis,
    ) -> Result<LayoutTree> {
        self.begin_pass();
        let result = self
            .measure_node(node, max_w, max_h, axis, 0)
            .and_then(|size| self.layout_node(node, Rect::new(x, y, size.w, size.h), axis, 0));
        self.end_pass("layout", &result);
        result
    }

    /// Lays `node` out to fill `rect` exactly.
    ///
    /// This is how a root is given the whole viewport.
    pub fn layout_in(&mut self, node: &VNode, rect: Rect, axis: Axis) -> Result<LayoutTree> {
        self.begin_pass();
        let result = self.layout_node(node, rect, axis, 0);
        self.end_pass("layout", &result);
        result
    }

    fn begin_pass(&mut self) {
        self.cache.clear();
        self.stats = LayoutStats::default();
    }

    fn end_pass<T>(&mut self, pass: &str, result: &Result<T>) {
        // Addresses must not outlive the borrowed tree.
        self.cache.clear();
        match result {
            Ok(_) => tracing::trace!(
                pass,
                measured = self.stats.measured,
                cache_hits = self.stats.cache_hits,
                "layout pass complete"
            ),
            Err(fatal) => tracing::debug!(pass, code = %fatal.code, detail = %fatal.detail, "layout failed"),
        }
    }

    fn check_depth(&self, node: &VNode, depth: usize) -> Result<()> {
        if depth >= self.config.max_depth {
            return Err(Fatal::new(
                ErrorCode::DepthLimit,
                format!(
                    "{} node is nested deeper than {} levels",
                    node.kind(),
                    self.config.max_depth
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn measure_node(
        &mut self,
        node: &VNode,
        max_w: i32,
        max_h: i32,
        axis: Axis,
        depth: usize,
    ) -> Result<Size> {
        self.check_depth(node, depth)?;
        let key = MeasureKey {
            node: std::ptr::from_ref(node) as usize,
            max_w: max_w.max(0),
            max_h: max_h.max(0),
            axis,
        };
        if let Some(size) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            return Ok(*size);
        }

        let size = self.measure_uncached(node, key.max_w, key.max_h, axis, depth)?;
        self.stats.measured += 1;
        self.cache.insert(key, size);
        Ok(size)
    }

    fn measure_uncached(
        &mut self,
        node: &VNode,
        max_w: i32,
        max_h: i32,
        axis: Axis,
        depth: usize,
    ) -> Result<Size> {
        let props = node.layout_props();
        let fixed_w = fixed_length(node, "width", props.width)?;
        let fixed_h = fixed_length(node, "height", props.height)?;
        let inner_w = fixed_w.map_or(max_w, |w| w.min(max_w));
        let inner_h = fixed_h.map_or(max_h, |h| h.min(max_h));

        let content = match node {
            VNode::Text(text) => leaf::measure_text(&text.text),
            VNode::Spacer(spacer) => leaf::measure_spacer(spacer.size, axis)?,
            VNode::Divider(_) => leaf::measure_divider(Size::new(inner_w, inner_h), axis),
            VNode::Box(container) => flex::measure_box(self, container, inner_w, inner_h, depth)?,
            VNode::Row(container) => flex::measure_stack(
                self,
                node.kind(),
                &container.props,
                &container.children,
                Axis::Row,
                Size::new(inner_w, inner_h),
                depth,
            )?,
            VNode::Column(container) => flex::measure_stack(
                self,
                node.kind(),
                &container.props,
                &container.children,
                Axis::Column,
                Size::new(inner_w, inner_h),
                depth,
            )?,
            VNode::Grid(container) => {
                grid::measure_grid(self, container, Size::new(inner_w, inner_h), axis, depth)?
            }
        };

        let size = Size::new(
            fixed_w.unwrap_or(content.w).min(max_w),
            fixed_h.unwrap_or(content.h).min(max_h),
        );
        tracing::trace!(kind = %node.kind(), w = size.w, h = size.h, max_w, max_h, "measured");
        Ok(size)
    }

    pub(crate) fn layout_node(
        &mut self,
        node: &VNode,
        rect: Rect,
        axis: Axis,
        depth: usize,
    ) -> Result<LayoutTree> {
        self.check_depth(node, depth)?;
        let children = match node {
            VNode::Text(_) | VNode::Spacer(_) | VNode::Divider(_) => Vec::new(),
            VNode::Box(container) => flex::layout_box(self, container, rect, depth)?,
            VNode::Row(container) => flex::layout_stack(
                self,
                node.kind(),
                &container.props,
                &container.children,
                Axis::Row,
                rect,
                depth,
            )?,
            VNode::Column(container) => flex::layout_stack(
                self,
                node.kind(),
                &container.props,
                &container.children,
                Axis::Column,
                rect,
                depth,
            )?,
            VNode::Grid(container) => grid::layout_grid(self, container, rect, axis, depth)?,
        };
        Ok(LayoutTree { rect, children })
    }
}

fn fixed_length(node: &VNode, prop: &str, value: Option<i32>) -> Result<Option<i32>> {
    match value {
        Some(v) if v < 0 => Err(Fatal::invalid_props(
            node.kind(),
            prop,
            format!("must be non-negative, got {v}"),
        )),
        other => Ok(other),
    }
}

/// Measures `node` with a fresh engine.
pub fn measure(node: &VNode, max_w: i32, max_h: i32, axis: Axis) -> Result<Size> {
    LayoutEngine::new().measure(node, max_w, max_h, axis)
}

/// Measures and lays out `node` at (`x`, `y`) with a fresh engine.
pub fn layout(
    node: &VNode,
    x: i32,
    y: i32,
    max_w: i32,
    max_h: i32,
    axis: Axis,
) -> Result<LayoutTree> {
    LayoutEngine::new().layout(node, x, y, max_w, max_h, axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::{BoxProps, StackProps};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_measure_is_clamped() {
        let node = VNode::text("hello world");
        assert_eq!(measure(&node, 80, 24, Axis::Column).unwrap(), Size::new(11, 1));
        assert_eq!(measure(&node, 4, 24, Axis::Column).unwrap(), Size::new(4, 1));
        assert_eq!(measure(&node, -5, -5, Axis::Column).unwrap(), Size::new(0, 0));
    }

    #[test]
    fn test_fixed_size_overrides_content() {
        let node = VNode::text("hello").with_width(8).with_height(3);
        assert_eq!(measure(&node, 80, 24, Axis::Column).unwrap(), Size::new(8, 3));
        assert_eq!(measure(&node, 6, 2, Axis::Column).unwrap(), Size::new(6, 2));
    }

    #[test]
    fn test_negative_fixed_size_is_invalid() {
        let node = VNode::text("x").with_width(-1);
        let err = measure(&node, 10, 10, Axis::Column).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidProps);
        assert!(err.detail.contains("width"));
    }

    #[test]
    fn test_layout_places_at_origin() {
        let node = VNode::text("abc");
        let tree = layout(&node, 3, 4, 80, 24, Axis::Column).unwrap();
        assert_eq!(tree, LayoutTree::leaf(Rect::new(3, 4, 3, 1)));
    }

    #[test]
    fn test_layout_in_fills_rect() {
        let node = VNode::column(StackProps::new(), [VNode::text("a")]);
        let tree = LayoutEngine::new()
            .layout_in(&node, Rect::new(0, 0, 20, 5), Axis::Column)
            .unwrap();
        assert_eq!(tree.rect, Rect::new(0, 0, 20, 5));
        assert_eq!(tree.children[0].rect, Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn test_depth_limit() {
        let mut node = VNode::text("leaf");
        for _ in 0..20 {
            node = VNode::boxed(BoxProps::new(), [node]);
        }
        let mut engine = LayoutEngine::with_config(LayoutConfig { max_depth: 8 });
        let err = engine.measure(&node, 80, 24, Axis::Column).unwrap_err();
        assert_eq!(err.code, ErrorCode::DepthLimit);

        let mut engine = LayoutEngine::with_config(LayoutConfig { max_depth: 64 });
        assert!(engine.layout(&node, 0, 0, 80, 24, Axis::Column).is_ok());
    }

    #[test]
    fn test_default_depth_handles_deep_trees() {
        let mut node = VNode::text("leaf");
        for _ in 0..300 {
            node = VNode::column(StackProps::new(), [node]);
        }
        let err = measure(&node, 80, 24, Axis::Column).unwrap_err();
        assert_eq!(err.code, ErrorCode::DepthLimit);
    }

    #[test]
    fn test_cache_hits_when_layout_matches_measure() {
        let node = VNode::column(StackProps::new(), [VNode::text("ab"), VNode::text("cd")]);
        let mut engine = LayoutEngine::new();
        let tree = engine.layout(&node, 0, 0, 2, 2, Axis::Column).unwrap();
        assert_eq!(tree.children[1].rect, Rect::new(0, 1, 2, 1));
        assert_eq!(
            engine.stats(),
            LayoutStats {
                measured: 3,
                cache_hits: 2,
            }
        );
    }
}
