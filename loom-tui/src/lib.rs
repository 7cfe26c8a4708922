//! Loom TUI: the per-frame core of a terminal UI framework.
//!
//! Every frame passes through the same three stages:
//!
//! - **Reconcile** ([`reconcile`]): match the new `VNode` tree against the
//!   previous frame's instances so that keyed and positional widgets keep
//!   their identity
//! - **Layout** ([`layout`]): measure and place every node with flex stacks,
//!   boxes and grids, in whole terminal cells
//! - **Drawlist** ([`drawlist`]): encode the laid-out tree as one ZRDL byte
//!   buffer for a rendering backend
//!
//! [`FramePipeline`] runs the stages in order and owns the state that lives
//! between frames. [`render_tree`] is the walk that turns a laid-out tree
//! into draw commands.
//!
//! # Example
//!
//! ```
//! use loom_tui::prelude::*;
//!
//! let mut pipeline = FramePipeline::new(PipelineConfig::default()).unwrap();
//! let root = VNode::boxed(
//!     BoxProps::new().border(true).title("Loom"),
//!     [VNode::text("hello")],
//! );
//! let frame = pipeline.render_frame(&root, Size::new(12, 3)).unwrap();
//!
//! let view = DrawlistView::parse(&frame.drawlist).unwrap();
//! assert!(view.strings().contains(&"hello"));
//! ```
//!
//! # Logging
//!
//! The crates emit `tracing` events and a `frame` span per
//! [`FramePipeline::render_frame`]; install any subscriber to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod error;
mod pipeline;
mod render;

pub use loom_tui_core as core;
pub use loom_tui_drawlist as drawlist;
pub use loom_tui_layout as layout;
pub use loom_tui_reconcile as reconcile;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{FrameOutput, FramePipeline};
pub use render::{render_tree, BorderGlyphs};

/// The types most frames need.
pub mod prelude {
    pub use crate::{FrameOutput, FramePipeline, PipelineConfig, PipelineError};
    pub use loom_tui_core::{
        Align, AlignSelf, BoxProps, DrawStyle, ErrorCode, GridProps, Justify, Rect, Rgb, Size,
        Spacing, StackProps, TextAttributes, VNode,
    };
    pub use loom_tui_drawlist::{Command, DrawlistBuilder, DrawlistConfig, DrawlistView};
    pub use loom_tui_layout::{Axis, LayoutEngine, LayoutTree};
    pub use loom_tui_reconcile::InstanceTree;
}
