//! Track-based grid placement.
//!
//! Children fill cells in row-major order: child `i` lands in row
//! `i / columns` and column `i % columns`. Without a `rows` prop the grid grows
//! as many auto rows as its children need; with one, children beyond
//! `columns * rows` are dropped and get no layout entry.

use loom_tui_core::vnode::Container;
use loom_tui_core::{Fatal, GridProps, Rect, Result, Size, VNode, WidgetKind};

use crate::axis::Axis;
use crate::distribute::floor_cells;
use crate::engine::LayoutEngine;
use crate::tracks::{offsets, parse_tracks, resolve_sizes, Track, Tracks};
use crate::tree::LayoutTree;

/// Parsed tracks, gaps and the children that fit.
struct GridPlan<'a> {
    columns: Tracks,
    rows: Tracks,
    column_gap: i32,
    row_gap: i32,
    placed: Vec<&'a VNode>,
}

impl<'a> GridPlan<'a> {
    fn new(props: &GridProps, children: &'a [Option<VNode>]) -> Result<Self> {
        let columns = parse_tracks(&props.columns, "columns")?;
        let explicit_rows = props
            .rows
            .as_ref()
            .map(|rows| parse_tracks(rows, "rows"))
            .transpose()?;
        let column_gap = grid_gap(props.column_gap, props.gap, "column_gap")?;
        let row_gap = grid_gap(props.row_gap, props.gap, "row_gap")?;

        let present: Vec<&VNode> = children.iter().flatten().collect();
        let (rows, placed) = if columns.is_empty() {
            (explicit_rows.unwrap_or_default(), Vec::new())
        } else if let Some(rows) = explicit_rows {
            let capacity = columns.len().saturating_mul(rows.len());
            if present.len() > capacity {
                tracing::debug!(
                    children = present.len(),
                    capacity,
                    "grid children beyond capacity are dropped"
                );
            }
            let placed = present.into_iter().take(capacity).collect();
            (rows, placed)
        } else {
            let row_count = present.len().div_ceil(columns.len());
            (std::iter::repeat(Track::Auto).take(row_count).collect(), present)
        };

        Ok(Self {
            columns,
            rows,
            column_gap,
            row_gap,
            placed,
        })
    }

    /// A grid with no tracks on either axis occupies nothing.
    fn is_collapsed(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    fn cell(&self, index: usize) -> (usize, usize) {
        let columns = self.columns.len();
        (index / columns, index % columns)
    }

    /// Natural track sizes: fixed tracks keep their size, every other track
    /// takes the largest child measured in it.
    fn natural_sizes(
        &self,
        engine: &mut LayoutEngine,
        max: Size,
        axis: Axis,
        depth: usize,
    ) -> Result<(Vec<i32>, Vec<i32>)> {
        let mut column_sizes = natural_seed(&self.columns);
        let mut row_sizes = natural_seed(&self.rows);
        for (index, child) in self.placed.iter().enumerate() {
            let (row, column) = self.cell(index);
            let max_w = fixed_or(self.columns[column], max.w);
            let max_h = fixed_or(self.rows[row], max.h);
            let size = engine.measure_node(child, max_w, max_h, axis, depth + 1)?;
            if !matches!(self.columns[column], Track::Fixed(_)) {
                column_sizes[column] = column_sizes[column].max(size.w);
            }
            if !matches!(self.rows[row], Track::Fixed(_)) {
                row_sizes[row] = row_sizes[row].max(size.h);
            }
        }
        Ok((column_sizes, row_sizes))
    }
}

fn grid_gap(specific: Option<f64>, shared: f64, prop: &str) -> Result<i32> {
    let (value, prop) = match specific {
        Some(value) => (value, prop),
        None => (shared, "gap"),
    };
    floor_cells(value).ok_or_else(|| {
        Fatal::invalid_props(WidgetKind::Grid, prop, format!("must be finite, got {value}"))
    })
}

fn natural_seed(tracks: &[Track]) -> Vec<i32> {
    tracks
        .iter()
        .map(|track| match track {
            Track::Fixed(size) => *size,
            Track::Auto | Track::Fr(_) => 0,
        })
        .collect()
}

fn fixed_or(track: Track, max: i32) -> i32 {
    match track {
        Track::Fixed(size) => size.min(max),
        Track::Auto | Track::Fr(_) => max,
    }
}

fn span(sizes: &[i32], gap: i32) -> i32 {
    let gaps = gap.saturating_mul(sizes.len().saturating_sub(1) as i32);
    sizes
        .iter()
        .fold(gaps, |total, size| total.saturating_add(*size))
}

/// Measures a grid from its tracks' natural sizes plus gaps.
pub(crate) fn measure_grid(
    engine: &mut LayoutEngine,
    grid: &Container<GridProps>,
    max: Size,
    axis: Axis,
    depth: usize,
) -> Result<Size> {
    let plan = GridPlan::new(&grid.props, &grid.children)?;
    if plan.is_collapsed() {
        return Ok(Size::ZERO);
    }
    let (columns, rows) = plan.natural_sizes(engine, max, axis, depth)?;
    Ok(Size::new(
        span(&columns, plan.column_gap).min(max.w),
        span(&rows, plan.row_gap).min(max.h),
    ))
}

/// Resolves track sizes within `rect` and gives every placed child its cell.
pub(crate) fn layout_grid(
    engine: &mut LayoutEngine,
    grid: &Container<GridProps>,
    rect: Rect,
    axis: Axis,
    depth: usize,
) -> Result<Vec<LayoutTree>> {
    let plan = GridPlan::new(&grid.props, &grid.children)?;
    if plan.is_collapsed() {
        return Ok(Vec::new());
    }

    let (natural_columns, natural_rows) = plan.natural_sizes(engine, rect.size(), axis, depth)?;
    let column_sizes = resolve_sizes(&plan.columns, &natural_columns, rect.w, plan.column_gap);
    let row_sizes = resolve_sizes(&plan.rows, &natural_rows, rect.h, plan.row_gap);
    let column_offsets = offsets(&column_sizes, plan.column_gap);
    let row_offsets = offsets(&row_sizes, plan.row_gap);

    let mut out = Vec::with_capacity(plan.placed.len());
    for (index, child) in plan.placed.iter().enumerate() {
        let (row, column) = plan.cell(index);
        // Cells pushed past the edge by gaps collapse onto it.
        let x = rect.x.saturating_add(column_offsets[column]).min(rect.right());
        let y = rect.y.saturating_add(row_offsets[row]).min(rect.bottom());
        let cell = Rect::new(x, y, column_sizes[column], row_sizes[row]);
        out.push(engine.layout_node(child, cell, axis, depth + 1)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use crate::{layout, measure, Axis, LayoutTree};
    use loom_tui_core::{BoxProps, ErrorCode, GridProps, Rect, Size, TrackSpec, VNode};
    use pretty_assertions::assert_eq;

    fn block(w: i32, h: i32) -> VNode {
        VNode::boxed(BoxProps::new(), []).with_width(w).with_height(h)
    }

    fn rects(tree: &LayoutTree) -> Vec<Rect> {
        tree.children.iter().map(|child| child.rect).collect()
    }

    #[test]
    fn test_auto_tracks_with_gaps() {
        let grid = VNode::grid(
            GridProps::new("auto auto")
                .rows("auto auto")
                .column_gap(1.0)
                .row_gap(2.0),
            [block(2, 1), block(5, 2), block(3, 4), block(1, 3)],
        );
        assert_eq!(measure(&grid, 80, 24, Axis::Column).unwrap(), Size::new(9, 8));

        let tree = layout(&grid, 0, 0, 80, 24, Axis::Column).unwrap();
        assert_eq!(
            rects(&tree),
            vec![
                Rect::new(0, 0, 3, 2),
                Rect::new(4, 0, 5, 2),
                Rect::new(0, 4, 3, 4),
                Rect::new(4, 4, 5, 4),
            ]
        );
    }

    #[test]
    fn test_count_columns_share_width() {
        let grid = VNode::grid(
            GridProps::new(3u32).gap(1.0),
            [block(1, 1), block(1, 1), block(1, 1), block(1, 1)],
        )
        .with_width(14);
        let tree = layout(&grid, 0, 0, 80, 24, Axis::Column).unwrap();
        assert_eq!(
            rects(&tree),
            vec![
                Rect::new(0, 0, 4, 1),
                Rect::new(5, 0, 4, 1),
                Rect::new(10, 0, 4, 1),
                Rect::new(0, 2, 4, 1),
            ]
        );
    }

    #[test]
    fn test_fixed_and_fr_tracks() {
        let grid = VNode::grid(
            GridProps::new("4 1fr 2fr"),
            [block(1, 1), block(1, 1), block(1, 1)],
        )
        .with_width(13);
        let tree = layout(&grid, 2, 0, 80, 24, Axis::Column).unwrap();
        assert_eq!(
            rects(&tree),
            vec![Rect::new(2, 0, 4, 1), Rect::new(6, 0, 3, 1), Rect::new(9, 0, 6, 1)]
        );
    }

    #[test]
    fn test_explicit_rows_drop_overflow() {
        let grid = VNode::grid(
            GridProps::new(2u32).rows(1u32),
            [block(1, 1), block(1, 1), block(1, 1)],
        );
        let tree = layout(&grid, 0, 0, 10, 10, Axis::Column).unwrap();
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn test_zero_tracks_measure_empty() {
        let no_columns = VNode::grid(GridProps::new(0u32), [block(2, 2)]);
        assert_eq!(measure(&no_columns, 10, 10, Axis::Column).unwrap(), Size::ZERO);

        let no_rows = VNode::grid(GridProps::new(2u32).rows(0u32), [block(2, 2)]);
        assert_eq!(measure(&no_rows, 10, 10, Axis::Column).unwrap(), Size::ZERO);
        assert!(layout(&no_rows, 0, 0, 10, 10, Axis::Column)
            .unwrap()
            .children
            .is_empty());
    }

    #[test]
    fn test_empty_grid() {
        let grid = VNode::grid(GridProps::new(3u32).gap(1.0), []);
        assert_eq!(measure(&grid, 10, 10, Axis::Column).unwrap(), Size::ZERO);
    }

    #[test]
    fn test_explicit_tracks_without_children_report_gaps() {
        let grid = VNode::grid(
            GridProps::new("auto auto auto").rows("auto auto").gap(1.0),
            [],
        );
        assert_eq!(measure(&grid, 10, 10, Axis::Column).unwrap(), Size::new(2, 1));
    }

    #[test]
    fn test_zero_space_gives_empty_cells() {
        let grid = VNode::grid(
            GridProps::new("1fr 1fr").gap(3.0),
            [block(2, 2), block(2, 2), block(2, 2)],
        );
        let tree = layout(&grid, 0, 0, 0, 0, Axis::Column).unwrap();
        assert_eq!(tree.children.len(), 3);
        assert!(tree.children.iter().all(|child| child.rect.is_empty()));
    }

    #[test]
    fn test_fractional_counts_and_gaps_floor() {
        let grid = VNode::grid(
            GridProps::new(TrackSpec::Count(2.7)).gap(1.5),
            [block(2, 1), block(2, 1)],
        );
        assert_eq!(measure(&grid, 80, 24, Axis::Column).unwrap(), Size::new(5, 1));
    }

    #[test]
    fn test_invalid_template_token() {
        let grid = VNode::grid(GridProps::new("auto 3em"), [block(1, 1)]);
        let err = measure(&grid, 10, 10, Axis::Column).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidProps);
        assert!(err.detail.contains("3em"));
        assert!(err.detail.contains("columns"));
    }

    #[test]
    fn test_non_finite_gap_is_invalid() {
        let grid = VNode::grid(GridProps::new(2u32).row_gap(f64::INFINITY), [block(1, 1)]);
        let err = measure(&grid, 10, 10, Axis::Column).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidProps);
        assert!(err.detail.contains("row_gap"));
    }
}
