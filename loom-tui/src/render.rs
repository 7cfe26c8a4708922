//! Turns a laid-out `VNode` tree into drawlist commands.

use loom_tui_core::vnode::{Container, TextNode};
use loom_tui_core::{BoxProps, DrawStyle, Rect, VNode};
use loom_tui_drawlist::{BuildResult, DrawlistBuilder};
use loom_tui_layout::{Axis, LayoutTree};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Single-line box-drawing glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    /// Top-left corner.
    pub top_left: char,
    /// Top-right corner.
    pub top_right: char,
    /// Bottom-left corner.
    pub bottom_left: char,
    /// Bottom-right corner.
    pub bottom_right: char,
    /// Horizontal edge, also the default horizontal divider.
    pub horizontal: char,
    /// Vertical edge, also the default vertical divider.
    pub vertical: char,
}

impl BorderGlyphs {
    /// `┌─┐│└┘`.
    pub const SINGLE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };
}

/// Emits the draw commands for `node` laid out as `layout`.
///
/// Containers clip their children to their own rectangle, boxes draw their
/// background, border and title, text draws one command per line, and
/// dividers repeat their glyph across the parent's cross axis. Nodes with an
/// empty rectangle are skipped along with their subtree.
///
/// Returns the builder's recorded error, if any command failed.
pub fn render_tree(
    builder: &mut DrawlistBuilder,
    node: &VNode,
    layout: &LayoutTree,
) -> BuildResult<()> {
    render_node(builder, node, layout, Axis::Column);
    match builder.error() {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

fn render_node(builder: &mut DrawlistBuilder, node: &VNode, layout: &LayoutTree, axis: Axis) {
    let rect = layout.rect;
    if rect.is_empty() {
        return;
    }
    match node {
        VNode::Text(text) => render_text(builder, text, rect),
        VNode::Spacer(_) => {}
        VNode::Divider(divider) => {
            let style = Some(&divider.style);
            match axis {
                Axis::Row => {
                    let glyph = divider.glyph.unwrap_or(BorderGlyphs::SINGLE.vertical);
                    let cell = glyph.to_string();
                    for row in 0..rect.h {
                        builder.draw_text(rect.x, rect.y + row, &cell, style);
                    }
                }
                Axis::Column => {
                    let glyph = divider.glyph.unwrap_or(BorderGlyphs::SINGLE.horizontal);
                    builder.draw_text(rect.x, rect.y, &repeat_to_width(glyph, rect.w), style);
                }
            }
        }
        VNode::Box(container) => {
            render_box_frame(builder, container, rect);
            render_children(builder, node, layout, Axis::Column);
        }
        VNode::Row(container) | VNode::Column(container) => {
            if let Some(style) = container.props.style.as_ref() {
                fill_background(builder, rect, style);
            }
            let axis = if matches!(node, VNode::Row(_)) {
                Axis::Row
            } else {
                Axis::Column
            };
            render_children(builder, node, layout, axis);
        }
        VNode::Grid(_) => render_children(builder, node, layout, axis),
    }
}

fn render_children(builder: &mut DrawlistBuilder, node: &VNode, layout: &LayoutTree, axis: Axis) {
    if layout.children.is_empty() {
        return;
    }
    let rect = layout.rect;
    builder.push_clip(rect.x, rect.y, rect.w, rect.h);
    for (child, child_layout) in node.present_children().zip(&layout.children) {
        render_node(builder, child, child_layout, axis);
    }
    builder.pop_clip();
}

fn render_text(builder: &mut DrawlistBuilder, text: &TextNode, rect: Rect) {
    let lines: Vec<&str> = text
        .text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .take(usize::try_from(rect.h).unwrap_or(0))
        .collect();
    let overflows = lines
        .iter()
        .any(|line| i32::try_from(line.width()).map_or(true, |w| w > rect.w));
    if overflows {
        builder.push_clip(rect.x, rect.y, rect.w, rect.h);
    }
    for (row, line) in (0..).zip(&lines) {
        if !line.is_empty() {
            builder.draw_text(rect.x, rect.y + row, line, Some(&text.style));
        }
    }
    if overflows {
        builder.pop_clip();
    }
}

fn fill_background(builder: &mut DrawlistBuilder, rect: Rect, style: &DrawStyle) {
    if style.bg.is_some() {
        builder.fill_rect(rect.x, rect.y, rect.w, rect.h, Some(style));
    }
}

fn render_box_frame(builder: &mut DrawlistBuilder, container: &Container<BoxProps>, rect: Rect) {
    let props = &container.props;
    fill_background(builder, rect, &props.style);
    if !props.border || rect.w < 2 || rect.h < 2 {
        return;
    }
    let glyphs = BorderGlyphs::SINGLE;
    let style = Some(&props.style);
    let inner = rect.w - 2;

    let mut top = String::new();
    top.push(glyphs.top_left);
    let mut used = 0;
    if let Some(title) = props.title.as_deref() {
        for ch in title.chars() {
            let w = i32::try_from(ch.width().unwrap_or(0)).unwrap_or(0);
            if used + w > inner {
                break;
            }
            top.push(ch);
            used += w;
        }
    }
    top.push_str(&repeat_to_width(glyphs.horizontal, inner - used));
    top.push(glyphs.top_right);
    builder.draw_text(rect.x, rect.y, &top, style);

    let side = glyphs.vertical.to_string();
    for row in 1..rect.h - 1 {
        builder.draw_text(rect.x, rect.y + row, &side, style);
        builder.draw_text(rect.right() - 1, rect.y + row, &side, style);
    }

    let mut bottom = String::new();
    bottom.push(glyphs.bottom_left);
    bottom.push_str(&repeat_to_width(glyphs.horizontal, inner));
    bottom.push(glyphs.bottom_right);
    builder.draw_text(rect.x, rect.bottom() - 1, &bottom, style);
}

/// Repeats `glyph` to fill `width` display columns.
fn repeat_to_width(glyph: char, width: i32) -> String {
    let glyph_width = glyph.width().unwrap_or(1).max(1);
    let count = usize::try_from(width).unwrap_or(0) / glyph_width;
    std::iter::repeat(glyph).take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::{GridProps, Rgb, StackProps};
    use loom_tui_drawlist::{Command, DrawlistView};
    use loom_tui_layout::LayoutEngine;
    use pretty_assertions::assert_eq;

    /// Lays out `node` in a `w` x `h` viewport and returns the drawn strings
    /// with their positions, skipping clips and definitions.
    fn draw(node: &VNode, w: i32, h: i32) -> (Vec<(i32, i32, String)>, Vec<Command>) {
        let layout = LayoutEngine::new()
            .layout_in(node, Rect::new(0, 0, w, h), Axis::Column)
            .unwrap();
        let mut builder = DrawlistBuilder::default();
        render_tree(&mut builder, node, &layout).unwrap();
        let bytes = builder.build().unwrap();
        let view = DrawlistView::parse(&bytes).unwrap();
        let texts = view
            .commands()
            .filter_map(|c| match c {
                Command::DrawText { x, y, .. } => {
                    Some((*x, *y, view.text_of(c).unwrap_or_default().to_string()))
                }
                _ => None,
            })
            .collect();
        let commands = view.draw_commands().copied().collect();
        (texts, commands)
    }

    fn text(x: i32, y: i32, s: &str) -> (i32, i32, String) {
        (x, y, s.to_string())
    }

    #[test]
    fn test_column_of_text() {
        let root = VNode::column(StackProps::new(), [VNode::text("ab"), VNode::text("c\nd")]);
        let (texts, commands) = draw(&root, 10, 5);
        assert_eq!(
            texts,
            vec![text(0, 0, "ab"), text(0, 1, "c"), text(0, 2, "d")]
        );
        assert!(matches!(
            commands.first(),
            Some(Command::PushClip { x: 0, y: 0, w: 10, h: 5 })
        ));
        assert_eq!(commands.last(), Some(&Command::PopClip));
    }

    #[test]
    fn test_bordered_box_with_title() {
        let root = VNode::boxed(
            BoxProps::new().border(true).title("Hi"),
            [VNode::text("x")],
        )
        .with_width(6)
        .with_height(3);
        let (texts, _) = draw(&root, 6, 3);
        assert_eq!(
            texts,
            vec![
                text(0, 0, "┌Hi──┐"),
                text(0, 1, "│"),
                text(5, 1, "│"),
                text(0, 2, "└────┘"),
                text(1, 1, "x"),
            ]
        );
    }

    #[test]
    fn test_long_title_is_cut() {
        let root = VNode::boxed(BoxProps::new().border(true).title("abcdef"), [])
            .with_width(5)
            .with_height(2);
        let (texts, _) = draw(&root, 5, 2);
        assert_eq!(texts[0], text(0, 0, "┌abc┐"));
        assert_eq!(texts[1], text(0, 1, "└───┘"));
    }

    #[test]
    fn test_box_background_fill() {
        let style = DrawStyle::new().bg(Rgb::new(0, 0, 80));
        let root = VNode::boxed(BoxProps::new().style(style), []);
        let (_, commands) = draw(&root, 4, 2);
        assert!(matches!(
            commands.as_slice(),
            [Command::FillRect { x: 0, y: 0, w: 4, h: 2, .. }]
        ));
    }

    #[test]
    fn test_dividers_follow_parent_axis() {
        let root = VNode::column(
            StackProps::new(),
            [
                VNode::divider(),
                VNode::row(
                    StackProps::new(),
                    [VNode::text("a"), VNode::divider(), VNode::text("b")],
                )
                .with_height(2),
            ],
        );
        let (texts, _) = draw(&root, 4, 3);
        assert_eq!(
            texts,
            vec![
                text(0, 0, "────"),
                text(0, 1, "a"),
                text(1, 1, "│"),
                text(1, 2, "│"),
                text(2, 1, "b"),
            ]
        );
    }

    #[test]
    fn test_overflowing_text_is_clipped() {
        let root = VNode::text("toolong");
        let (texts, commands) = draw(&root, 3, 1);
        assert_eq!(texts, vec![text(0, 0, "toolong")]);
        assert!(matches!(
            commands.as_slice(),
            [
                Command::PushClip { x: 0, y: 0, w: 3, h: 1 },
                Command::DrawText { .. },
                Command::PopClip,
            ]
        ));
    }

    #[test]
    fn test_empty_nodes_draw_nothing() {
        let root = VNode::column(
            StackProps::new(),
            [VNode::text(""), VNode::spacer(2), VNode::grid(GridProps::new(0.0), [])],
        );
        let (texts, _) = draw(&root, 5, 5);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_builder_failure_is_reported() {
        let root = VNode::text("hello");
        let layout = LayoutEngine::new()
            .layout_in(&root, Rect::new(0, 0, 5, 1), Axis::Column)
            .unwrap();
        let mut builder = DrawlistBuilder::new(loom_tui_drawlist::DrawlistConfig {
            max_string_bytes: Some(2),
            ..Default::default()
        })
        .unwrap();
        let err = render_tree(&mut builder, &root, &layout).unwrap_err();
        assert_eq!(err.code, loom_tui_core::ErrorCode::TooLarge);
    }
}
