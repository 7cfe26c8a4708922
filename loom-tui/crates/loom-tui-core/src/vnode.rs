//! Widget description nodes.
//!
//! A [`VNode`] is the immutable, per-frame description of one widget. The
//! widget catalog produces a fresh tree every frame; the reconciler, the layout
//! engine and the render walk only ever read it.
//!
//! `VNode` is a closed sum type: adding a kind is a compile error at every
//! `match` that has to handle it. Container children are stored as
//! `Option<VNode>` so that conditional children can leave holes that every
//! consumer skips.
//!
//! # Example
//!
//! ```
//! use loom_tui_core::vnode::{StackProps, VNode, WidgetKind};
//!
//! let tree = VNode::column(
//!     StackProps::new().gap(1.0),
//!     [
//!         VNode::text("title").with_key("title"),
//!         VNode::spacer(1),
//!         VNode::text("body"),
//!     ],
//! );
//!
//! assert_eq!(tree.kind(), WidgetKind::Column);
//! assert_eq!(tree.children().len(), 3);
//! assert_eq!(tree.children()[0].as_ref().and_then(VNode::key), Some("title"));
//! ```

use std::fmt;

use crate::style::DrawStyle;

/// The kind tag of a [`VNode`].
///
/// Reconciliation only reuses an instance when the kind is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A run of text.
    Text,
    /// Empty space along the parent's main axis.
    Spacer,
    /// A line across the parent's cross axis.
    Divider,
    /// A bordered, padded column container.
    Box,
    /// A horizontal flex container.
    Row,
    /// A vertical flex container.
    Column,
    /// A track-based grid container.
    Grid,
}

impl WidgetKind {
    /// Returns the lowercase kind name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Spacer => "spacer",
            Self::Divider => "divider",
            Self::Box => "box",
            Self::Row => "row",
            Self::Column => "column",
            Self::Grid => "grid",
        }
    }

    /// Returns whether nodes of this kind carry children.
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Box | Self::Row | Self::Column | Self::Grid)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-axis alignment of a flex container's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// Children sit at the start of the cross axis.
    #[default]
    Start,
    /// Children are centered on the cross axis.
    Center,
    /// Children sit at the end of the cross axis.
    End,
    /// Children fill the cross axis.
    Stretch,
}

/// Per-child override of the parent's [`Align`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlignSelf {
    /// Inherit the parent's alignment.
    #[default]
    Auto,
    /// Sit at the start of the cross axis.
    Start,
    /// Center on the cross axis.
    Center,
    /// Sit at the end of the cross axis.
    End,
    /// Fill the cross axis.
    Stretch,
}

impl AlignSelf {
    /// Resolves `Auto` against the parent's alignment.
    pub const fn resolve(self, parent: Align) -> Align {
        match self {
            Self::Auto => parent,
            Self::Start => Align::Start,
            Self::Center => Align::Center,
            Self::End => Align::End,
            Self::Stretch => Align::Stretch,
        }
    }
}

/// Main-axis distribution of leftover space when no child flexes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    /// Pack children at the start.
    #[default]
    Start,
    /// Center the children.
    Center,
    /// Pack children at the end.
    End,
    /// Spread leftover space between children.
    Between,
}

/// Props every node carries regardless of kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutProps {
    /// Reconciliation key, unique among siblings.
    pub key: Option<String>,
    /// Widget id, unique across one committed tree.
    pub id: Option<String>,
    /// Fixed width in cells.
    pub width: Option<i32>,
    /// Fixed height in cells.
    pub height: Option<i32>,
    /// Weight for sharing the parent's leftover main-axis space.
    pub flex: u32,
    /// Cross-axis alignment override.
    pub align_self: AlignSelf,
}

/// Per-side spacing in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    /// Top inset.
    pub top: i32,
    /// Right inset.
    pub right: i32,
    /// Bottom inset.
    pub bottom: i32,
    /// Left inset.
    pub left: i32,
}

impl Spacing {
    /// Uniform spacing on all sides.
    pub const fn all(value: i32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Horizontal and vertical spacing.
    pub const fn symmetric(horizontal: i32, vertical: i32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// Props of a flex stack (row or column).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackProps {
    /// Space between children; fractional values are floored.
    pub gap: f64,
    /// Default cross-axis alignment of children.
    pub align: Align,
    /// Main-axis distribution of leftover space.
    pub justify: Justify,
    /// Break children into lines when the main axis runs out.
    pub wrap: bool,
    /// Optional background fill.
    pub style: Option<DrawStyle>,
}

impl StackProps {
    /// Creates default stack props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gap between children.
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Sets the cross-axis alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Sets the main-axis justification.
    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    /// Enables line wrapping.
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Sets the background fill.
    pub fn style(mut self, style: DrawStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// Props of a box container.
///
/// A box lays its children out as a column inside its border and padding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxProps {
    /// Draw a one-cell border.
    pub border: bool,
    /// Padding inside the border.
    pub padding: Spacing,
    /// Optional title drawn on the top border.
    pub title: Option<String>,
    /// Fill and border style.
    pub style: DrawStyle,
    /// Stack behaviour of the inner column.
    pub stack: StackProps,
}

impl BoxProps {
    /// Creates default box props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the border.
    pub fn border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    /// Sets the padding.
    pub fn padding(mut self, padding: Spacing) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the style.
    pub fn style(mut self, style: DrawStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the inner stack props.
    pub fn stack(mut self, stack: StackProps) -> Self {
        self.stack = stack;
        self
    }
}

/// A grid axis definition as supplied by the widget layer.
///
/// Parsing and validation happen in the layout engine, which reports
/// `INVALID_PROPS` with the offending token.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSpec {
    /// `n` equal flexible tracks; fractional counts are floored.
    Count(f64),
    /// A whitespace-separated template such as `"auto 10 2fr 4px"`.
    Template(String),
}

impl From<f64> for TrackSpec {
    fn from(value: f64) -> Self {
        Self::Count(value)
    }
}

impl From<u32> for TrackSpec {
    fn from(value: u32) -> Self {
        Self::Count(f64::from(value))
    }
}

impl From<&str> for TrackSpec {
    fn from(value: &str) -> Self {
        Self::Template(value.to_string())
    }
}

/// Props of a grid container.
#[derive(Debug, Clone, PartialEq)]
pub struct GridProps {
    /// Column tracks.
    pub columns: TrackSpec,
    /// Row tracks; `None` grows implicit `auto` rows to fit the children.
    pub rows: Option<TrackSpec>,
    /// Gap used on both axes unless overridden.
    pub gap: f64,
    /// Column gap override.
    pub column_gap: Option<f64>,
    /// Row gap override.
    pub row_gap: Option<f64>,
}

impl Default for GridProps {
    fn default() -> Self {
        Self {
            columns: TrackSpec::Count(1.0),
            rows: None,
            gap: 0.0,
            column_gap: None,
            row_gap: None,
        }
    }
}

impl GridProps {
    /// Creates grid props with the given columns.
    pub fn new(columns: impl Into<TrackSpec>) -> Self {
        Self {
            columns: columns.into(),
            ..Self::default()
        }
    }

    /// Sets explicit rows.
    pub fn rows(mut self, rows: impl Into<TrackSpec>) -> Self {
        self.rows = Some(rows.into());
        self
    }

    /// Sets the gap for both axes.
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Overrides the gap between columns.
    pub fn column_gap(mut self, gap: f64) -> Self {
        self.column_gap = Some(gap);
        self
    }

    /// Overrides the gap between rows.
    pub fn row_gap(mut self, gap: f64) -> Self {
        self.row_gap = Some(gap);
        self
    }
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    /// The text; newlines start new rows.
    pub text: String,
    /// Resolved style.
    pub style: DrawStyle,
    /// Common props.
    pub layout: LayoutProps,
}

/// A spacer leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacerNode {
    /// Length along the parent's main axis.
    pub size: i32,
    /// Common props.
    pub layout: LayoutProps,
}

/// A divider leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct DividerNode {
    /// Glyph repeated along the divider; `None` picks one by orientation.
    pub glyph: Option<char>,
    /// Resolved style.
    pub style: DrawStyle,
    /// Common props.
    pub layout: LayoutProps,
}

/// A container node with kind-specific props and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Container<P> {
    /// Kind-specific props.
    pub props: P,
    /// Common props.
    pub layout: LayoutProps,
    /// Children in source order; `None` entries are holes.
    pub children: Vec<Option<VNode>>,
}

impl<P> Container<P> {
    fn new(props: P, children: Vec<Option<VNode>>) -> Self {
        Self {
            props,
            layout: LayoutProps::default(),
            children,
        }
    }
}

/// An immutable widget description node.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    /// A text leaf.
    Text(TextNode),
    /// A spacer leaf.
    Spacer(SpacerNode),
    /// A divider leaf.
    Divider(DividerNode),
    /// A box container.
    Box(Container<BoxProps>),
    /// A horizontal stack.
    Row(Container<StackProps>),
    /// A vertical stack.
    Column(Container<StackProps>),
    /// A grid.
    Grid(Container<GridProps>),
}

impl VNode {
    /// Creates a text leaf with the default style.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextNode {
            text: text.into(),
            style: DrawStyle::default(),
            layout: LayoutProps::default(),
        })
    }

    /// Creates a styled text leaf.
    pub fn styled_text(text: impl Into<String>, style: DrawStyle) -> Self {
        Self::Text(TextNode {
            text: text.into(),
            style,
            layout: LayoutProps::default(),
        })
    }

    /// Creates a spacer of the given main-axis length.
    pub fn spacer(size: i32) -> Self {
        Self::Spacer(SpacerNode {
            size,
            layout: LayoutProps::default(),
        })
    }

    /// Creates a divider with the orientation's default glyph.
    pub fn divider() -> Self {
        Self::Divider(DividerNode {
            glyph: None,
            style: DrawStyle::default(),
            layout: LayoutProps::default(),
        })
    }

    /// Creates a box container.
    pub fn boxed(props: BoxProps, children: impl IntoIterator<Item = VNode>) -> Self {
        Self::Box(Container::new(props, children.into_iter().map(Some).collect()))
    }

    /// Creates a row container.
    pub fn row(props: StackProps, children: impl IntoIterator<Item = VNode>) -> Self {
        Self::Row(Container::new(props, children.into_iter().map(Some).collect()))
    }

    /// Creates a column container.
    pub fn column(props: StackProps, children: impl IntoIterator<Item = VNode>) -> Self {
        Self::Column(Container::new(props, children.into_iter().map(Some).collect()))
    }

    /// Creates a grid container.
    pub fn grid(props: GridProps, children: impl IntoIterator<Item = VNode>) -> Self {
        Self::Grid(Container::new(props, children.into_iter().map(Some).collect()))
    }

    /// Creates a container of `kind` whose children may contain holes.
    ///
    /// Returns `None` for leaf kinds. Containers get default props.
    pub fn container_with_holes(kind: WidgetKind, children: Vec<Option<VNode>>) -> Option<Self> {
        let node = match kind {
            WidgetKind::Box => Self::Box(Container::new(BoxProps::default(), children)),
            WidgetKind::Row => Self::Row(Container::new(StackProps::default(), children)),
            WidgetKind::Column => Self::Column(Container::new(StackProps::default(), children)),
            WidgetKind::Grid => Self::Grid(Container::new(GridProps::default(), children)),
            WidgetKind::Text | WidgetKind::Spacer | WidgetKind::Divider => return None,
        };
        Some(node)
    }

    /// Returns the kind tag.
    pub const fn kind(&self) -> WidgetKind {
        match self {
            Self::Text(_) => WidgetKind::Text,
            Self::Spacer(_) => WidgetKind::Spacer,
            Self::Divider(_) => WidgetKind::Divider,
            Self::Box(_) => WidgetKind::Box,
            Self::Row(_) => WidgetKind::Row,
            Self::Column(_) => WidgetKind::Column,
            Self::Grid(_) => WidgetKind::Grid,
        }
    }

    /// Returns the common props.
    pub fn layout_props(&self) -> &LayoutProps {
        match self {
            Self::Text(n) => &n.layout,
            Self::Spacer(n) => &n.layout,
            Self::Divider(n) => &n.layout,
            Self::Box(c) => &c.layout,
            Self::Row(c) | Self::Column(c) => &c.layout,
            Self::Grid(c) => &c.layout,
        }
    }

    /// Returns the common props mutably.
    pub fn layout_props_mut(&mut self) -> &mut LayoutProps {
        match self {
            Self::Text(n) => &mut n.layout,
            Self::Spacer(n) => &mut n.layout,
            Self::Divider(n) => &mut n.layout,
            Self::Box(c) => &mut c.layout,
            Self::Row(c) | Self::Column(c) => &mut c.layout,
            Self::Grid(c) => &mut c.layout,
        }
    }

    /// Returns the reconciliation key, if any.
    pub fn key(&self) -> Option<&str> {
        self.layout_props().key.as_deref()
    }

    /// Returns the widget id, if any.
    pub fn id(&self) -> Option<&str> {
        self.layout_props().id.as_deref()
    }

    /// Returns the children of a container; leaves have none.
    pub fn children(&self) -> &[Option<VNode>] {
        match self {
            Self::Text(_) | Self::Spacer(_) | Self::Divider(_) => &[],
            Self::Box(c) => &c.children,
            Self::Row(c) | Self::Column(c) => &c.children,
            Self::Grid(c) => &c.children,
        }
    }

    /// Iterates the children, skipping holes.
    pub fn present_children(&self) -> impl Iterator<Item = &VNode> {
        self.children().iter().flatten()
    }

    /// Sets the reconciliation key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.layout_props_mut().key = Some(key.into());
        self
    }

    /// Sets the widget id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.layout_props_mut().id = Some(id.into());
        self
    }

    /// Sets a fixed width.
    pub fn with_width(mut self, width: i32) -> Self {
        self.layout_props_mut().width = Some(width);
        self
    }

    /// Sets a fixed height.
    pub fn with_height(mut self, height: i32) -> Self {
        self.layout_props_mut().height = Some(height);
        self
    }

    /// Sets the flex weight.
    pub fn with_flex(mut self, flex: u32) -> Self {
        self.layout_props_mut().flex = flex;
        self
    }

    /// Sets the cross-axis alignment override.
    pub fn with_align_self(mut self, align: AlignSelf) -> Self {
        self.layout_props_mut().align_self = align;
        self
    }
}
