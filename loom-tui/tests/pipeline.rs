//! Full frames through reconcile, layout, render and build.

use loom_tui::prelude::*;
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn block(w: i32, h: i32) -> VNode {
    VNode::boxed(BoxProps::new(), []).with_width(w).with_height(h)
}

fn dashboard(items: &[&str]) -> VNode {
    VNode::column(
        StackProps::new(),
        [
            VNode::text("Title").with_key("title"),
            VNode::divider().with_key("rule"),
            VNode::grid(
                GridProps::new("auto auto").rows("auto auto").column_gap(1.0).row_gap(2.0),
                [block(2, 1), block(5, 2), block(3, 4), block(1, 3)],
            )
            .with_key("grid"),
            VNode::column(
                StackProps::new(),
                items.iter().map(|item| VNode::text(*item).with_key(*item)),
            )
            .with_key("list"),
        ],
    )
}

#[test]
fn test_frame_layout_and_drawlist() {
    init_tracing();
    let mut pipeline = FramePipeline::new(PipelineConfig::default()).unwrap();
    let frame = pipeline
        .render_frame(&dashboard(&["one"]), Size::new(20, 12))
        .unwrap();

    assert_eq!(frame.layout.rect, Rect::new(0, 0, 20, 12));
    let grid = frame.layout.descendant(&[2]).unwrap();
    let cells: Vec<Rect> = grid.children.iter().map(|c| c.rect).collect();
    assert_eq!(
        cells,
        vec![
            Rect::new(0, 2, 3, 2),
            Rect::new(4, 2, 5, 2),
            Rect::new(0, 6, 3, 4),
            Rect::new(4, 6, 5, 4),
        ]
    );
    assert_eq!(frame.layout.descendant(&[3, 0]).unwrap().rect.y, 10);

    let view = DrawlistView::parse(&frame.drawlist).unwrap();
    let header = view.header();
    assert_eq!(header.total_size as usize, frame.drawlist.len());
    assert_eq!(header.cmd_count as usize, view.records().len());
    let record_bytes: u32 = view.records().iter().map(|r| r.size).sum();
    assert_eq!(record_bytes, header.cmd_bytes);
    assert!(view.records().iter().all(|r| r.offset % 4 == 0 && r.size % 4 == 0));

    let rule = "─".repeat(20);
    let texts: Vec<&str> = view.commands().filter_map(|c| view.text_of(c)).collect();
    assert_eq!(texts, vec!["Title", rule.as_str(), "one"]);

    let pushes = view
        .commands()
        .filter(|c| matches!(c, Command::PushClip { .. }))
        .count();
    let pops = view
        .commands()
        .filter(|c| matches!(c, Command::PopClip))
        .count();
    assert_eq!(pushes, pops);
}

#[test]
fn test_keyed_items_keep_identity_across_frames() {
    init_tracing();
    let mut pipeline = FramePipeline::new(PipelineConfig::default()).unwrap();
    let first = pipeline
        .render_frame(&dashboard(&["a", "b", "c"]), Size::new(20, 16))
        .unwrap();
    let second = pipeline
        .render_frame(&dashboard(&["c", "a"]), Size::new(20, 16))
        .unwrap();

    assert!(second.commit.mounted.is_empty());
    assert_eq!(second.commit.unmounted.len(), 1);
    assert_eq!(
        second.commit.reused.len() + second.commit.unmounted.len(),
        first.commit.mounted.len()
    );
    assert_eq!(pipeline.instances().len(), first.commit.mounted.len() - 1);
}

#[test]
fn test_string_cache_survives_frames() {
    init_tracing();
    let config = PipelineConfig::from_toml_str(
        r#"
        [drawlist]
        encoded_string_cache_cap = 64
        "#,
    )
    .unwrap();
    let mut pipeline = FramePipeline::new(config).unwrap();
    let root = dashboard(&["x", "y"]);

    let first = pipeline.render_frame(&root, Size::new(20, 14)).unwrap();
    let misses = pipeline.builder().stats().cache.misses;
    let second = pipeline.render_frame(&root, Size::new(20, 14)).unwrap();

    assert_eq!(first.drawlist, second.drawlist);
    assert_eq!(pipeline.builder().stats().cache.misses, misses);
    assert!(pipeline.builder().stats().cache.hits >= misses);
}

#[test]
fn test_caps_from_config_fail_the_frame() {
    init_tracing();
    let config = PipelineConfig::from_toml_str(
        r#"
        [drawlist]
        max_drawlist_bytes = 96
        "#,
    )
    .unwrap();
    let mut pipeline = FramePipeline::new(config).unwrap();
    let err = pipeline
        .render_frame(&dashboard(&["item"]), Size::new(20, 12))
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TooLarge));

    // Commands stay within the cap once the frame is small enough.
    let frame = pipeline
        .render_frame(&VNode::spacer(1), Size::new(20, 12))
        .unwrap();
    assert_eq!(frame.drawlist.len(), 64);
}

#[test]
fn test_depth_limit_from_config() {
    init_tracing();
    let config = PipelineConfig::from_toml_str("[layout]\nmax_depth = 3\n").unwrap();
    let mut pipeline = FramePipeline::new(config).unwrap();
    let mut node = VNode::text("leaf");
    for _ in 0..4 {
        node = VNode::column(StackProps::new(), [node]);
    }
    let err = pipeline.render_frame(&node, Size::new(10, 10)).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::DepthLimit));
}
