//! One frame from widget description to drawlist bytes.

use bytes::Bytes;
use loom_tui_core::{Rect, Size, VNode};
use loom_tui_drawlist::DrawlistBuilder;
use loom_tui_layout::{Axis, LayoutEngine, LayoutTree};
use loom_tui_reconcile::{CommitReport, InstanceTree};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::render::render_tree;

/// Everything one frame produced.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// The finished ZRDL buffer.
    pub drawlist: Bytes,
    /// Absolute rectangles of the frame's tree.
    pub layout: LayoutTree,
    /// Instances mounted, reused and unmounted by the frame.
    pub commit: CommitReport,
}

/// Owns the state that lives across frames and runs them one at a time.
///
/// Each frame commits the tree against the previous frame's instances, lays
/// it out to fill the viewport, renders it into the builder and builds the
/// drawlist. The builder is reset after every frame, failed or not, so its
/// encoded-string cache is the only drawlist state carried forward.
///
/// A frame that fails after its commit keeps the committed instances; the
/// next frame reconciles against them.
///
/// # Example
///
/// ```
/// use loom_tui::{FramePipeline, PipelineConfig};
/// use loom_tui_core::{Size, StackProps, VNode};
///
/// let mut pipeline = FramePipeline::new(PipelineConfig::default()).unwrap();
/// let root = VNode::column(StackProps::new(), [VNode::text("hello")]);
/// let frame = pipeline.render_frame(&root, Size::new(20, 5)).unwrap();
/// assert_eq!(frame.commit.mounted.len(), 2);
/// assert_eq!(frame.layout.rect.w, 20);
/// ```
#[derive(Debug)]
pub struct FramePipeline {
    config: PipelineConfig,
    instances: InstanceTree,
    engine: LayoutEngine,
    builder: DrawlistBuilder,
    frame_count: u64,
}

impl FramePipeline {
    /// Creates a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let builder = DrawlistBuilder::new(config.drawlist.clone())?;
        let mut instances = InstanceTree::new();
        instances.set_max_depth(config.layout.max_depth);
        Ok(Self {
            engine: LayoutEngine::with_config(config.layout),
            instances,
            builder,
            config,
            frame_count: 0,
        })
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the persistent instance tree.
    pub const fn instances(&self) -> &InstanceTree {
        &self.instances
    }

    /// Returns the drawlist builder, for its cache statistics.
    pub const fn builder(&self) -> &DrawlistBuilder {
        &self.builder
    }

    /// Returns how many frames have completed successfully.
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Runs one frame of `root` in a viewport of `viewport` cells.
    pub fn render_frame(&mut self, root: &VNode, viewport: Size) -> PipelineResult<FrameOutput> {
        let span = tracing::debug_span!("frame", frame = self.frame_count);
        let _enter = span.enter();

        let result = self.run(root, viewport);
        self.builder.reset();
        match &result {
            Ok(output) => {
                self.frame_count += 1;
                tracing::debug!(
                    mounted = output.commit.mounted.len(),
                    unmounted = output.commit.unmounted.len(),
                    bytes = output.drawlist.len(),
                    "frame complete"
                );
            }
            Err(err) => tracing::warn!(error = %err, "frame failed"),
        }
        result
    }

    /// Tears down every instance, returning their ids parents first.
    pub fn unmount_all(&mut self) -> Vec<loom_tui_core::InstanceId> {
        self.instances.clear()
    }

    fn run(&mut self, root: &VNode, viewport: Size) -> PipelineResult<FrameOutput> {
        let commit = self.instances.commit(root)?;
        let viewport = Rect::new(0, 0, viewport.w, viewport.h);
        let layout = self.engine.layout_in(root, viewport, Axis::Column)?;
        render_tree(&mut self.builder, root, &layout)?;
        let drawlist = self.builder.build()?;
        Ok(FrameOutput {
            drawlist,
            layout,
            commit,
        })
    }
}
