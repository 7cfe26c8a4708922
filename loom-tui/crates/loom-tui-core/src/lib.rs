//! Core types for `Loom TUI`.
//!
//! This crate provides the vocabulary shared by every stage of the frame
//! pipeline:
//!
//! - [`vnode`]: Immutable widget description nodes (`VNode`) and their props
//! - [`id`]: Instance identifiers and the monotonic allocator
//! - [`geometry`]: 2D geometry primitives (Point, Size, Rect)
//! - [`style`]: Packed draw styles (colors, attributes, underline color)
//! - [`error`]: Structured `Fatal` results and their error codes
//!
//! # Examples
//!
//! ## Describing a tree
//!
//! ```
//! use loom_tui_core::vnode::{GridProps, StackProps, VNode};
//!
//! let tree = VNode::column(
//!     StackProps::new().gap(1.0),
//!     [
//!         VNode::text("header"),
//!         VNode::grid(
//!             GridProps::new("auto 1fr").gap(1.0),
//!             [VNode::text("name"), VNode::text("value")],
//!         ),
//!     ],
//! );
//! assert_eq!(tree.present_children().count(), 2);
//! ```
//!
//! ## Allocating identities
//!
//! ```
//! use loom_tui_core::id::InstanceIdAllocator;
//!
//! let mut ids = InstanceIdAllocator::new();
//! assert_eq!(ids.allocate().as_u64(), 1);
//! assert_eq!(ids.allocate().as_u64(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::match_same_arms)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod style;
pub mod vnode;

// Re-export commonly used types at the crate root for convenience
pub use error::{ErrorCode, Fatal, Result};
pub use geometry::{Point, Rect, Size};
pub use id::{InstanceId, InstanceIdAllocator};
pub use style::{DrawStyle, Rgb, TextAttributes};
pub use vnode::{
    Align, AlignSelf, BoxProps, GridProps, Justify, LayoutProps, Spacing, StackProps, TrackSpec,
    VNode, WidgetKind,
};

/// Default ceiling on tree depth for recursive walks (commit, measure, layout).
///
/// Walks deeper than this fail with [`ErrorCode::DepthLimit`] instead of
/// exhausting the call stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;
