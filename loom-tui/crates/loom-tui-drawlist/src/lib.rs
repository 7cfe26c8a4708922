//! ZRDL drawlist encoding for `Loom TUI`.
//!
//! A drawlist is the single immutable byte buffer a frame hands to the
//! terminal backend. It carries a command stream, a deduplicated string
//! table and a blob table (styled text runs, canvas pixels, images).
//!
//! - [`DrawlistBuilder`]: accumulates commands for one frame, enforces the
//!   caps in [`DrawlistConfig`], and produces the buffer with `build()`
//! - [`DrawlistView`]: parses and validates a buffer for backends and tests
//! - [`format`]: header layout, opcodes and record sizes
//!
//! # Example
//!
//! ```
//! use loom_tui_drawlist::{Command, DrawlistBuilder, DrawlistConfig, DrawlistView};
//!
//! let mut builder = DrawlistBuilder::new(DrawlistConfig::default()).unwrap();
//! builder.draw_text(0, 0, "hi", None);
//! builder.draw_text(0, 1, "hi", None);
//! let bytes = builder.build().unwrap();
//!
//! let view = DrawlistView::parse(&bytes).unwrap();
//! assert_eq!(view.strings(), &["hi"]);
//! assert_eq!(view.draw_commands().count(), 2);
//! assert!(matches!(view.records()[0].command, Command::DefString { id: 1, .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

mod builder;
mod codec;
mod config;
mod error;
pub mod format;
mod reader;
mod strings;
mod text_run;

pub use builder::{BuilderStats, CanvasCommand, CursorState, DrawlistBuilder, ImageCommand};
pub use codec::align4;
pub use config::DrawlistConfig;
pub use error::{BuildError, BuildResult, ParseError};
pub use format::{
    Blitter, CursorShape, Header, ImageFit, ImageFormat, ImageProtocol, Opcode, PackedStyle,
};
pub use reader::{Command, CommandRecord, DrawlistView};
pub use strings::{CacheStats, EncodedStringCache};
pub use text_run::{TextRunEntry, TextRunSegment};
