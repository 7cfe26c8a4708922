//! Row, column and box stacking.
//!
//! A stack lays its present children out along its main axis, separated by
//! `gap`. Leftover main-axis space goes to children with a non-zero `flex`
//! weight; when none flex, `justify` positions the run instead. On the cross
//! axis every child is aligned by its resolved `align_self`. With `wrap` set,
//! children are broken greedily into lines that stack along the cross axis.

use loom_tui_core::vnode::Container;
use loom_tui_core::{
    Align, BoxProps, Fatal, Justify, Rect, Result, Size, Spacing, StackProps, VNode, WidgetKind,
};
use smallvec::SmallVec;

use crate::axis::Axis;
use crate::distribute::{distribute, floor_cells};
use crate::engine::LayoutEngine;
use crate::tree::LayoutTree;

/// A measured child awaiting placement.
struct Item<'a> {
    node: &'a VNode,
    size: Size,
}

/// A run of items sharing one cross-axis band.
#[derive(Default)]
struct Line<'a> {
    items: SmallVec<[Item<'a>; 8]>,
    main: i32,
    cross: i32,
}

fn stack_gap(kind: WidgetKind, props: &StackProps) -> Result<i32> {
    floor_cells(props.gap).ok_or_else(|| {
        Fatal::invalid_props(kind, "gap", format!("must be finite, got {}", props.gap))
    })
}

fn measure_child(
    engine: &mut LayoutEngine,
    node: &VNode,
    dir: Axis,
    main: i32,
    cross: i32,
    depth: usize,
) -> Result<Size> {
    let max = dir.size(main, cross);
    engine.measure_node(node, max.w, max.h, dir, depth + 1)
}

/// Measures children in order, each offered the main-axis space left over.
fn measure_run<'a>(
    engine: &mut LayoutEngine,
    children: &'a [Option<VNode>],
    dir: Axis,
    max: Size,
    gap: i32,
    depth: usize,
) -> Result<Line<'a>> {
    let max_main = dir.main(max);
    let max_cross = dir.cross(max);
    let mut line = Line::default();
    for node in children.iter().flatten() {
        let lead = if line.items.is_empty() { 0 } else { gap };
        let available = max_main.saturating_sub(line.main).saturating_sub(lead).max(0);
        let size = measure_child(engine, node, dir, available, max_cross, depth)?;
        line.main = line.main.saturating_add(lead).saturating_add(dir.main(size));
        line.cross = line.cross.max(dir.cross(size));
        line.items.push(Item { node, size });
    }
    Ok(line)
}

/// Breaks children into lines no longer than the main-axis space.
fn wrap_lines<'a>(
    engine: &mut LayoutEngine,
    children: &'a [Option<VNode>],
    dir: Axis,
    max: Size,
    gap: i32,
    depth: usize,
) -> Result<Vec<Line<'a>>> {
    let max_main = dir.main(max);
    let max_cross = dir.cross(max);
    let mut lines = Vec::new();
    let mut line = Line::default();
    for node in children.iter().flatten() {
        let size = measure_child(engine, node, dir, max_main, max_cross, depth)?;
        let main = dir.main(size);
        if !line.items.is_empty() && line.main.saturating_add(gap).saturating_add(main) > max_main
        {
            lines.push(std::mem::take(&mut line));
        }
        if !line.items.is_empty() {
            line.main = line.main.saturating_add(gap);
        }
        line.main = line.main.saturating_add(main);
        line.cross = line.cross.max(dir.cross(size));
        line.items.push(Item { node, size });
    }
    if !line.items.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// Measures a row or column stack.
pub(crate) fn measure_stack(
    engine: &mut LayoutEngine,
    kind: WidgetKind,
    props: &StackProps,
    children: &[Option<VNode>],
    dir: Axis,
    max: Size,
    depth: usize,
) -> Result<Size> {
    let gap = stack_gap(kind, props)?;
    let (main, cross) = if props.wrap {
        let lines = wrap_lines(engine, children, dir, max, gap, depth)?;
        let main = lines.iter().map(|line| line.main).max().unwrap_or(0);
        let bands: i32 = lines.iter().map(|line| line.cross).sum();
        let gaps = gap.saturating_mul(lines.len().saturating_sub(1) as i32);
        (main, bands.saturating_add(gaps))
    } else {
        let line = measure_run(engine, children, dir, max, gap, depth)?;
        (line.main, line.cross)
    };
    Ok(dir.size(main.min(dir.main(max)), cross.min(dir.cross(max))))
}

/// Lays out a row or column stack inside `rect`.
pub(crate) fn layout_stack(
    engine: &mut LayoutEngine,
    kind: WidgetKind,
    props: &StackProps,
    children: &[Option<VNode>],
    dir: Axis,
    rect: Rect,
    depth: usize,
) -> Result<Vec<LayoutTree>> {
    let gap = stack_gap(kind, props)?;
    let size = rect.size();
    let mut out = Vec::with_capacity(children.len());

    if !props.wrap {
        let line = measure_run(engine, children, dir, size, gap, depth)?;
        let band = Band {
            main_start: dir.main_start(rect),
            main_size: dir.main(size),
            cross_start: dir.cross_start(rect),
            cross_size: dir.cross(size),
        };
        place_line(engine, props, dir, &line, band, gap, depth, &mut out)?;
        return Ok(out);
    }

    let cross_end = dir.cross_start(rect).saturating_add(dir.cross(size));
    let mut cross_cursor = dir.cross_start(rect);
    for line in wrap_lines(engine, children, dir, size, gap, depth)? {
        let band = Band {
            main_start: dir.main_start(rect),
            main_size: dir.main(size),
            cross_start: cross_cursor,
            cross_size: line.cross.min(cross_end.saturating_sub(cross_cursor).max(0)),
        };
        place_line(engine, props, dir, &line, band, gap, depth, &mut out)?;
        cross_cursor = cross_cursor.saturating_add(line.cross).saturating_add(gap);
    }
    Ok(out)
}

/// The region one line is placed into.
#[derive(Clone, Copy)]
struct Band {
    main_start: i32,
    main_size: i32,
    cross_start: i32,
    cross_size: i32,
}

#[allow(clippy::too_many_arguments)]
fn place_line(
    engine: &mut LayoutEngine,
    props: &StackProps,
    dir: Axis,
    line: &Line<'_>,
    band: Band,
    gap: i32,
    depth: usize,
    out: &mut Vec<LayoutTree>,
) -> Result<()> {
    let count = line.items.len();
    if count == 0 {
        return Ok(());
    }

    let mut mains: SmallVec<[i32; 8]> = line.items.iter().map(|item| dir.main(item.size)).collect();
    let mut spacing: SmallVec<[i32; 8]> = SmallVec::from_elem(0, count);
    let mut lead = 0;

    let leftover = band.main_size.saturating_sub(line.main);
    if leftover > 0 {
        let weights: SmallVec<[f64; 8]> = line
            .items
            .iter()
            .map(|item| f64::from(item.node.layout_props().flex))
            .collect();
        if weights.iter().any(|w| *w > 0.0) {
            for (main, share) in mains.iter_mut().zip(distribute(leftover, &weights)) {
                *main += share;
            }
        } else {
            match props.justify {
                Justify::Start => {}
                Justify::Center => lead = leftover / 2,
                Justify::End => lead = leftover,
                Justify::Between if count > 1 => {
                    let slots = vec![1.0; count - 1];
                    for (slot, extra) in spacing.iter_mut().zip(distribute(leftover, &slots)) {
                        *slot = extra;
                    }
                }
                Justify::Between => {}
            }
        }
    }

    let main_end = band.main_start.saturating_add(band.main_size);
    let mut cursor = band.main_start.saturating_add(lead);
    for (index, item) in line.items.iter().enumerate() {
        let main = mains[index].min(main_end.saturating_sub(cursor).max(0));
        let (cross_offset, cross) = align_cross(props.align, dir, item, band.cross_size);
        let child_rect = dir.rect(cursor, band.cross_start + cross_offset, main, cross);
        out.push(engine.layout_node(item.node, child_rect, dir, depth + 1)?);
        cursor = cursor
            .saturating_add(mains[index])
            .saturating_add(gap)
            .saturating_add(spacing[index]);
    }
    Ok(())
}

/// Returns the cross-axis offset and length of `item` within a band.
fn align_cross(parent: Align, dir: Axis, item: &Item<'_>, band: i32) -> (i32, i32) {
    let props = item.node.layout_props();
    let fixed_cross = match dir {
        Axis::Row => props.height.is_some(),
        Axis::Column => props.width.is_some(),
    };
    let natural = dir.cross(item.size).min(band);
    match props.align_self.resolve(parent) {
        Align::Stretch if !fixed_cross => (0, band),
        Align::Start | Align::Stretch => (0, natural),
        Align::Center => ((band - natural) / 2, natural),
        Align::End => (band - natural, natural),
    }
}

fn box_insets(props: &BoxProps) -> Result<Spacing> {
    let Spacing {
        top,
        right,
        bottom,
        left,
    } = props.padding;
    if top < 0 || right < 0 || bottom < 0 || left < 0 {
        return Err(Fatal::invalid_props(
            WidgetKind::Box,
            "padding",
            format!("sides must be non-negative, got {top} {right} {bottom} {left}"),
        ));
    }
    let border = i32::from(props.border);
    Ok(Spacing {
        top: top.saturating_add(border),
        right: right.saturating_add(border),
        bottom: bottom.saturating_add(border),
        left: left.saturating_add(border),
    })
}

/// Measures a box: its children as a column, plus border and padding.
pub(crate) fn measure_box(
    engine: &mut LayoutEngine,
    container: &Container<BoxProps>,
    max_w: i32,
    max_h: i32,
    depth: usize,
) -> Result<Size> {
    let insets = box_insets(&container.props)?;
    let horizontal = insets.left.saturating_add(insets.right);
    let vertical = insets.top.saturating_add(insets.bottom);
    let inner = Size::new(max_w.saturating_sub(horizontal), max_h.saturating_sub(vertical));
    let content = measure_stack(
        engine,
        WidgetKind::Box,
        &container.props.stack,
        &container.children,
        Axis::Column,
        inner,
        depth,
    )?;
    Ok(Size::new(
        content.w.saturating_add(horizontal).min(max_w),
        content.h.saturating_add(vertical).min(max_h),
    ))
}

/// Lays out a box's children as a column inside its border and padding.
pub(crate) fn layout_box(
    engine: &mut LayoutEngine,
    container: &Container<BoxProps>,
    rect: Rect,
    depth: usize,
) -> Result<Vec<LayoutTree>> {
    let insets = box_insets(&container.props)?;
    let inner = rect.inset_sides(insets.left, insets.top, insets.right, insets.bottom);
    layout_stack(
        engine,
        WidgetKind::Box,
        &container.props.stack,
        &container.children,
        Axis::Column,
        inner,
        depth,
    )
}
