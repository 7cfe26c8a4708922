//! Layout engine for `Loom TUI`.
//!
//! This crate turns a `VNode` tree into absolute cell rectangles. Containers
//! come in two families:
//!
//! - **Stacks** (`row`, `column`, and `box`, which is a column inside an
//!   optional border and padding) place children along a main axis with
//!   gaps, flex weights, justification, cross-axis alignment and wrapping.
//! - **Grids** place children row-major into tracks parsed from a count or a
//!   template of `auto`, fixed (`10`, `10px`) and fractional (`2fr`) tokens.
//!
//! Leaves measure intrinsically: text by display width, spacers along the
//! parent's main axis, dividers across it.
//!
//! # Overview
//!
//! - [`measure`]: the size a node wants within constraints
//! - [`layout`]: measure, then place the node and every descendant
//! - [`LayoutEngine`]: the same operations with a configurable depth limit
//!   and a per-pass measure cache
//! - [`LayoutTree`]: the resulting rectangles, mirroring present children
//!
//! All arithmetic is in whole cells. Fractional gaps and track counts are
//! floored, negative results clamp to zero, and nothing is ever placed
//! outside the space its parent was given.
//!
//! # Example
//!
//! ```rust
//! use loom_tui_core::{GridProps, Rect, StackProps, VNode};
//! use loom_tui_layout::{layout, Axis};
//!
//! let tree = VNode::column(
//!     StackProps::new().gap(1.0),
//!     [
//!         VNode::text("title"),
//!         VNode::grid(
//!             GridProps::new("auto auto").gap(1.0),
//!             [VNode::text("k"), VNode::text("value")],
//!         ),
//!     ],
//! );
//!
//! let layout = layout(&tree, 0, 0, 80, 24, Axis::Column).unwrap();
//! assert_eq!(layout.rect, Rect::new(0, 0, 7, 3));
//! assert_eq!(layout.children[1].children[1].rect, Rect::new(2, 2, 5, 1));
//! ```
//!
//! # Errors
//!
//! Malformed props (unknown track tokens, non-finite gaps, negative sizes or
//! padding) fail with `INVALID_PROPS`; trees nested deeper than
//! [`LayoutConfig::max_depth`] fail with `DEPTH_LIMIT`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod axis;
mod distribute;
mod engine;
mod flex;
mod grid;
mod leaf;
mod tracks;
mod tree;

pub use axis::Axis;
pub use distribute::distribute;
pub use engine::{layout, measure, LayoutConfig, LayoutEngine, LayoutStats};
pub use leaf::measure_text;
pub use tracks::{parse_tracks, Track, Tracks};
pub use tree::LayoutTree;
