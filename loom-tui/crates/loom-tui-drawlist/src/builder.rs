//! The drawlist builder.

use bytes::{BufMut, Bytes, BytesMut};
use loom_tui_core::DrawStyle;

use crate::codec::{align4, len_u32, pad4};
use crate::config::DrawlistConfig;
use crate::error::{BuildError, BuildResult};
use crate::format::{
    Blitter, CursorShape, Header, ImageFit, ImageFormat, ImageProtocol, LinkRefs, Opcode,
    PackedStyle, CMD_HEADER_SIZE, HEADER_SIZE, MAGIC, SPAN_SIZE, VERSION,
};
use crate::strings::{CacheStats, EncodedStringCache, Interned, StringTable};
use crate::text_run::{self, TextRunEntry, TextRunSegment};

/// Cursor state for [`DrawlistBuilder::set_cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Cursor shape.
    pub shape: CursorShape,
    /// Whether the cursor is shown.
    pub visible: bool,
    /// Whether the cursor blinks.
    pub blink: bool,
}

/// Arguments of [`DrawlistBuilder::draw_canvas`].
///
/// The blob must hold exactly `px_width * px_height` RGBA pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanvasCommand {
    /// Destination column.
    pub x: i32,
    /// Destination row.
    pub y: i32,
    /// Width in cells.
    pub cols: u32,
    /// Height in cells.
    pub rows: u32,
    /// Pixel width of the blob.
    pub px_width: u32,
    /// Pixel height of the blob.
    pub px_height: u32,
    /// Blob index of the pixels.
    pub blob_index: u32,
    /// Pixel-to-cell mapping.
    pub blitter: Blitter,
}

/// Arguments of [`DrawlistBuilder::draw_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageCommand {
    /// Destination column.
    pub x: i32,
    /// Destination row.
    pub y: i32,
    /// Width in cells.
    pub cols: u32,
    /// Height in cells.
    pub rows: u32,
    /// Pixel width of the image.
    pub px_width: u32,
    /// Pixel height of the image.
    pub px_height: u32,
    /// Blob index of the image data.
    pub blob_index: u32,
    /// Caller-chosen id that lets backends reuse uploaded images.
    pub image_id: u32,
    /// Blob encoding.
    pub format: ImageFormat,
    /// Requested terminal protocol.
    pub protocol: ImageProtocol,
    /// Stacking layer relative to text.
    pub z_layer: i8,
    /// Fit mode.
    pub fit: ImageFit,
}

/// Counters describing the builder's current contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderStats {
    /// Command records, `DEF_*` included.
    pub commands: u32,
    /// Bytes in the command stream.
    pub cmd_bytes: usize,
    /// Interned strings.
    pub strings: usize,
    /// Bytes in the string pool.
    pub string_bytes: usize,
    /// Blobs.
    pub blobs: usize,
    /// Bytes of blob payload.
    pub blob_bytes: usize,
    /// Encoded-string cache counters, cumulative across resets.
    pub cache: CacheStats,
}

/// How much an append would add to each capped quantity.
#[derive(Debug, Clone, Copy, Default)]
struct Growth {
    cmds: usize,
    cmd_bytes: usize,
    strings: usize,
    string_bytes: usize,
    blobs: usize,
    blob_bytes: usize,
}

impl Growth {
    const fn command(op: Opcode) -> Self {
        Self {
            cmds: 1,
            cmd_bytes: op.record_size(),
            strings: 0,
            string_bytes: 0,
            blobs: 0,
            blob_bytes: 0,
        }
    }
}

/// Accumulates one frame of drawing commands into a ZRDL buffer.
///
/// Primitives never return errors directly. The first failure is recorded,
/// every later primitive becomes a no-op, and [`build`](Self::build) returns
/// the recorded error until [`reset`](Self::reset) is called. Caps are checked
/// before anything is appended, so a failed builder never holds more than its
/// caps allow.
///
/// The first use of each distinct string in a build appends a `DEF_STRING`
/// record; blobs likewise get a `DEF_BLOB` record. Both count toward
/// `max_cmd_count`.
///
/// # Example
///
/// ```
/// use loom_tui_core::DrawStyle;
/// use loom_tui_drawlist::{DrawlistBuilder, DrawlistConfig, DrawlistView};
///
/// let mut builder = DrawlistBuilder::new(DrawlistConfig::default()).unwrap();
/// builder.clear();
/// builder.fill_rect(0, 0, 10, 2, Some(&DrawStyle::new().bold()));
/// builder.draw_text(1, 0, "hello", None);
/// let bytes = builder.build().unwrap();
///
/// let view = DrawlistView::parse(&bytes).unwrap();
/// assert_eq!(view.header().cmd_count, 4);
/// assert_eq!(view.string(1), Some("hello"));
/// builder.reset();
/// ```
#[derive(Debug)]
pub struct DrawlistBuilder {
    config: DrawlistConfig,
    cmds: BytesMut,
    cmd_count: u32,
    strings: StringTable,
    blob_spans: Vec<(u32, u32)>,
    blob_pool: BytesMut,
    blob_bytes: usize,
    cache: EncodedStringCache,
    clip_depth: u32,
    link: LinkRefs,
    error: Option<BuildError>,
}

impl Default for DrawlistBuilder {
    fn default() -> Self {
        Self::with_valid_config(DrawlistConfig::default())
    }
}

impl DrawlistBuilder {
    /// Creates a builder, rejecting zero caps with `BAD_PARAMS`.
    pub fn new(config: DrawlistConfig) -> BuildResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: DrawlistConfig) -> Self {
        let cache = EncodedStringCache::new(config.encoded_string_cache_cap);
        Self {
            config,
            cmds: BytesMut::new(),
            cmd_count: 0,
            strings: StringTable::default(),
            blob_spans: Vec::new(),
            blob_pool: BytesMut::new(),
            blob_bytes: 0,
            cache,
            clip_depth: 0,
            link: LinkRefs::default(),
            error: None,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &DrawlistConfig {
        &self.config
    }

    /// Returns the recorded failure, if any.
    pub const fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// Returns counters for the current contents.
    pub fn stats(&self) -> BuilderStats {
        BuilderStats {
            commands: self.cmd_count,
            cmd_bytes: self.cmds.len(),
            strings: self.strings.len(),
            string_bytes: self.strings.pool_len(),
            blobs: self.blob_spans.len(),
            blob_bytes: self.blob_bytes,
            cache: self.cache.stats(),
        }
    }

    /// Clears the framebuffer.
    pub fn clear(&mut self) {
        self.push_command(Opcode::Clear, |_| {});
    }

    /// Fills a rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, style: Option<&DrawStyle>) {
        if !self.check_rect("fill_rect", x, y, w, h) {
            return;
        }
        let style = PackedStyle::pack(style, self.link);
        self.push_command(Opcode::FillRect, |buf| {
            put_rect(buf, x, y, w, h);
            style.encode(buf);
        });
    }

    /// Draws `text` starting at (`x`, `y`).
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, style: Option<&DrawStyle>) {
        if self.error.is_some() {
            return;
        }
        let Some(interned) = self.intern(text) else {
            return;
        };
        let style = PackedStyle::pack(style, self.link);
        self.push_command(Opcode::DrawText, |buf| {
            buf.put_i32_le(x);
            buf.put_i32_le(y);
            buf.put_u32_le(interned.id);
            buf.put_u32_le(0);
            buf.put_u32_le(interned.byte_len);
            style.encode(buf);
            buf.put_u32_le(0);
        });
    }

    /// Stores a styled text run as a blob and returns its index.
    ///
    /// Returns `None` once the builder has failed.
    pub fn add_text_run_blob(&mut self, segments: &[TextRunSegment]) -> Option<u32> {
        if self.error.is_some() {
            return None;
        }
        let mut entries = Vec::with_capacity(segments.len());
        for segment in segments {
            let interned = self.intern(&segment.text)?;
            entries.push(TextRunEntry {
                style: PackedStyle::pack(Some(&segment.style), self.link),
                string_id: interned.id,
                byte_off: 0,
                byte_len: interned.byte_len,
            });
        }
        self.push_blob(&text_run::encode(&entries))
    }

    /// Draws a text run previously stored with
    /// [`add_text_run_blob`](Self::add_text_run_blob).
    pub fn draw_text_run(&mut self, x: i32, y: i32, blob_index: u32) {
        if !self.check_blob("draw_text_run", blob_index) {
            return;
        }
        self.push_command(Opcode::DrawTextRun, |buf| {
            buf.put_i32_le(x);
            buf.put_i32_le(y);
            buf.put_u32_le(blob_index);
            buf.put_u32_le(0);
        });
    }

    /// Pushes a clip rectangle.
    pub fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if !self.check_rect("push_clip", x, y, w, h) {
            return;
        }
        if self.push_command(Opcode::PushClip, |buf| put_rect(buf, x, y, w, h)) {
            self.clip_depth += 1;
        }
    }

    /// Pops the innermost clip rectangle.
    pub fn pop_clip(&mut self) {
        if self.error.is_some() {
            return;
        }
        if self.config.validate_params && self.clip_depth == 0 {
            self.fail(BuildError::bad_params("pop_clip without a matching push_clip"));
            return;
        }
        if self.push_command(Opcode::PopClip, |_| {}) {
            self.clip_depth = self.clip_depth.saturating_sub(1);
        }
    }

    /// Sets cursor position, shape and visibility.
    pub fn set_cursor(&mut self, cursor: CursorState) {
        self.push_command(Opcode::SetCursor, |buf| {
            buf.put_i32_le(cursor.x);
            buf.put_i32_le(cursor.y);
            buf.put_u8(cursor.shape as u8);
            buf.put_u8(u8::from(cursor.visible));
            buf.put_u8(u8::from(cursor.blink));
            buf.put_u8(0);
        });
    }

    /// Hides the cursor.
    pub fn hide_cursor(&mut self) {
        self.set_cursor(CursorState {
            x: -1,
            y: -1,
            shape: CursorShape::Block,
            visible: false,
            blink: false,
        });
    }

    /// Starts or ends a hyperlink.
    ///
    /// While a link is active its URI (and optional id) string references
    /// are stamped into the style of every text, fill and text-run segment.
    /// `None` ends the link.
    pub fn set_link(&mut self, uri: Option<&str>, id: Option<&str>) {
        if self.error.is_some() {
            return;
        }
        let Some(uri) = uri else {
            self.link = LinkRefs::default();
            return;
        };
        if self.config.validate_params && uri.is_empty() {
            self.fail(BuildError::bad_params("set_link: empty uri"));
            return;
        }
        let Some(uri) = self.intern(uri) else {
            return;
        };
        let id = match id {
            Some(id) => match self.intern(id) {
                Some(interned) => interned.id,
                None => return,
            },
            None => 0,
        };
        self.link = LinkRefs { uri: uri.id, id };
    }

    /// Draws an RGBA canvas blob.
    pub fn draw_canvas(&mut self, canvas: &CanvasCommand) {
        if !self.check_blob("draw_canvas", canvas.blob_index) {
            return;
        }
        if self.config.validate_params {
            let expected = u64::from(canvas.px_width) * u64::from(canvas.px_height) * 4;
            let actual = self.blob_len(canvas.blob_index);
            if expected != actual {
                self.fail(BuildError::bad_params(format!(
                    "draw_canvas: blob {} holds {actual} bytes, {}x{} RGBA needs {expected}",
                    canvas.blob_index, canvas.px_width, canvas.px_height
                )));
                return;
            }
        }
        self.push_command(Opcode::DrawCanvas, |buf| {
            buf.put_i32_le(canvas.x);
            buf.put_i32_le(canvas.y);
            buf.put_u32_le(canvas.cols);
            buf.put_u32_le(canvas.rows);
            buf.put_u32_le(canvas.px_width);
            buf.put_u32_le(canvas.px_height);
            buf.put_u32_le(canvas.blob_index);
            buf.put_u8(canvas.blitter as u8);
            buf.put_bytes(0, 3);
        });
    }

    /// Draws an image blob.
    pub fn draw_image(&mut self, image: &ImageCommand) {
        if !self.check_blob("draw_image", image.blob_index) {
            return;
        }
        if self.config.validate_params {
            let actual = self.blob_len(image.blob_index);
            let ok = match image.format {
                ImageFormat::Rgba => {
                    actual == u64::from(image.px_width) * u64::from(image.px_height) * 4
                }
                ImageFormat::Png => actual > 0,
            };
            if !ok {
                self.fail(BuildError::bad_params(format!(
                    "draw_image: blob {} ({actual} bytes) does not match {:?} {}x{}",
                    image.blob_index, image.format, image.px_width, image.px_height
                )));
                return;
            }
        }
        self.push_command(Opcode::DrawImage, |buf| {
            buf.put_i32_le(image.x);
            buf.put_i32_le(image.y);
            buf.put_u32_le(image.cols);
            buf.put_u32_le(image.rows);
            buf.put_u32_le(image.px_width);
            buf.put_u32_le(image.px_height);
            buf.put_u32_le(image.blob_index);
            buf.put_u32_le(image.image_id);
            buf.put_u8(image.format as u8);
            buf.put_u8(image.protocol as u8);
            buf.put_i8(image.z_layer);
            buf.put_u8(image.fit as u8);
        });
    }

    /// Stores raw bytes as a blob and returns its index.
    ///
    /// Returns `None` once the builder has failed.
    pub fn add_blob(&mut self, bytes: &[u8]) -> Option<u32> {
        if self.error.is_some() {
            return None;
        }
        self.push_blob(bytes)
    }

    /// Pre-allocates `bytes` of string pool.
    ///
    /// The hint is checked against `max_drawlist_bytes`, or the `u32` size
    /// limit of the format when no cap is set, before anything is allocated.
    pub fn reserve_text_arena(&mut self, bytes: usize) {
        if self.error.is_some() {
            return;
        }
        let growth = Growth {
            string_bytes: bytes,
            ..Growth::default()
        };
        if !self.check_total(&growth) {
            return;
        }
        self.strings.reserve(bytes);
    }

    /// Produces the finished buffer.
    ///
    /// The builder keeps its contents; call [`reset`](Self::reset) before the
    /// next frame.
    pub fn build(&mut self) -> BuildResult<Bytes> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let cmd_bytes = self.cmds.len();
        let strings_count = self.strings.len();
        let strings_pool = align4(self.strings.pool_len());
        let blobs_count = self.blob_spans.len();
        let blobs_pool = self.blob_pool.len();

        let mut header = Header {
            magic: MAGIC,
            version: VERSION,
            header_size: HEADER_SIZE as u32,
            ..Header::default()
        };
        let mut offset = HEADER_SIZE;
        if self.cmd_count > 0 {
            header.cmd_offset = len_u32(offset);
            header.cmd_bytes = len_u32(cmd_bytes);
            header.cmd_count = self.cmd_count;
            offset += cmd_bytes;
        }
        if strings_count > 0 {
            header.strings_span_offset = len_u32(offset);
            header.strings_count = len_u32(strings_count);
            offset += strings_count * SPAN_SIZE;
            header.strings_bytes_offset = len_u32(offset);
            header.strings_bytes_len = len_u32(strings_pool);
            offset += strings_pool;
        }
        if blobs_count > 0 {
            header.blobs_span_offset = len_u32(offset);
            header.blobs_count = len_u32(blobs_count);
            offset += blobs_count * SPAN_SIZE;
            header.blobs_bytes_offset = len_u32(offset);
            header.blobs_bytes_len = len_u32(blobs_pool);
            offset += blobs_pool;
        }
        header.total_size = len_u32(offset);

        let mut out = BytesMut::with_capacity(offset);
        header.encode(&mut out);
        out.put_slice(&self.cmds);
        if strings_count > 0 {
            for &(byte_off, byte_len) in self.strings.spans() {
                out.put_u32_le(byte_off);
                out.put_u32_le(byte_len);
            }
            out.put_slice(self.strings.pool());
            pad4(&mut out);
        }
        if blobs_count > 0 {
            for &(byte_off, byte_len) in &self.blob_spans {
                out.put_u32_le(byte_off);
                out.put_u32_le(byte_len);
            }
            out.put_slice(&self.blob_pool);
        }
        debug_assert_eq!(out.len(), offset);

        tracing::trace!(
            commands = self.cmd_count,
            strings = strings_count,
            blobs = blobs_count,
            bytes = offset,
            "drawlist built"
        );
        Ok(out.freeze())
    }

    /// Returns the builder to its freshly constructed state.
    ///
    /// Commands, strings, blobs, clip depth, the active link and any recorded
    /// error are discarded. The encoded-string cache is kept.
    pub fn reset(&mut self) {
        self.cmds.clear();
        self.cmd_count = 0;
        self.strings.clear();
        self.blob_spans.clear();
        self.blob_pool.clear();
        self.blob_bytes = 0;
        self.clip_depth = 0;
        self.link = LinkRefs::default();
        self.error = None;
    }

    fn fail(&mut self, error: BuildError) {
        if self.error.is_none() {
            tracing::debug!(code = %error.code, detail = %error.detail, "drawlist build failed");
            self.error = Some(error);
        }
    }

    fn check_rect(&mut self, op: &str, x: i32, y: i32, w: i32, h: i32) -> bool {
        if self.error.is_some() {
            return false;
        }
        if !self.config.validate_params {
            return true;
        }
        if w < 0 || h < 0 {
            self.fail(BuildError::bad_params(format!(
                "{op}: negative size {w}x{h}"
            )));
            return false;
        }
        if x.checked_add(w).is_none() || y.checked_add(h).is_none() {
            self.fail(BuildError::bad_params(format!(
                "{op}: rectangle ({x}, {y}, {w}, {h}) overflows i32"
            )));
            return false;
        }
        true
    }

    fn check_blob(&mut self, op: &str, blob_index: u32) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.config.validate_params && blob_index as usize >= self.blob_spans.len() {
            self.fail(BuildError::bad_params(format!(
                "{op}: unknown blob index {blob_index}"
            )));
            return false;
        }
        true
    }

    fn blob_len(&self, blob_index: u32) -> u64 {
        self.blob_spans
            .get(blob_index as usize)
            .map_or(0, |&(_, len)| u64::from(len))
    }

    /// Size of the finished buffer if `growth` were appended, saturating
    /// instead of overflowing.
    fn projected_size(&self, growth: &Growth) -> u64 {
        let strings = total(self.strings.len(), growth.strings);
        let blobs = total(self.blob_spans.len(), growth.blobs);
        [
            HEADER_SIZE as u64,
            total(self.cmds.len(), growth.cmd_bytes),
            strings.saturating_mul(SPAN_SIZE as u64),
            align4_u64(total(self.strings.pool_len(), growth.string_bytes)),
            blobs.saturating_mul(SPAN_SIZE as u64),
            (self.blob_pool.len() as u64).saturating_add(align4_u64(growth.blob_bytes as u64)),
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    /// Checks the projected buffer size against `max_drawlist_bytes`, or
    /// against the largest size a `u32` header can describe.
    fn check_total(&mut self, growth: &Growth) -> bool {
        let requested = self.projected_size(growth);
        let (cap, limit) = match self.config.max_drawlist_bytes {
            Some(limit) => ("max_drawlist_bytes", limit),
            None => ("drawlist format size", u32::MAX),
        };
        if requested > u64::from(limit) {
            self.fail(BuildError::too_large(cap, limit, requested));
            return false;
        }
        true
    }

    /// Checks every cap against the current contents plus `growth`.
    fn admit(&mut self, growth: Growth) -> bool {
        let checks = [
            (
                "max_cmd_count",
                self.config.max_cmd_count,
                u64::from(self.cmd_count).saturating_add(growth.cmds as u64),
            ),
            (
                "max_strings",
                self.config.max_strings,
                total(self.strings.len(), growth.strings),
            ),
            (
                "max_string_bytes",
                self.config.max_string_bytes,
                total(self.strings.pool_len(), growth.string_bytes),
            ),
            (
                "max_blobs",
                self.config.max_blobs,
                total(self.blob_spans.len(), growth.blobs),
            ),
            (
                "max_blob_bytes",
                self.config.max_blob_bytes,
                total(self.blob_bytes, growth.blob_bytes),
            ),
        ];
        for (cap, limit, requested) in checks {
            if let Some(limit) = limit {
                if requested > u64::from(limit) {
                    self.fail(BuildError::too_large(cap, limit, requested));
                    return false;
                }
            }
        }
        self.check_total(&growth)
    }

    /// Appends one fixed-size record. Returns whether it was appended.
    fn push_command(&mut self, op: Opcode, payload: impl FnOnce(&mut BytesMut)) -> bool {
        if self.error.is_some() || !self.admit(Growth::command(op)) {
            return false;
        }
        let start = self.cmds.len();
        let size = op.record_size();
        self.cmds.put_u16_le(op as u16);
        self.cmds.put_u16_le(0);
        self.cmds.put_u32_le(len_u32(size));
        payload(&mut self.cmds);
        debug_assert_eq!(self.cmds.len() - start, size, "{op:?} record size");
        debug_assert!(size >= CMD_HEADER_SIZE);
        self.cmd_count += 1;
        true
    }

    fn push_definition(&mut self, op: Opcode, id: u32, byte_off: u32, byte_len: u32) {
        let size = op.record_size();
        self.cmds.put_u16_le(op as u16);
        self.cmds.put_u16_le(0);
        self.cmds.put_u32_le(len_u32(size));
        self.cmds.put_u32_le(id);
        self.cmds.put_u32_le(byte_off);
        self.cmds.put_u32_le(byte_len);
        self.cmds.put_u32_le(0);
        self.cmd_count += 1;
    }

    /// Returns the id of `text`, interning it on first use.
    fn intern(&mut self, text: &str) -> Option<Interned> {
        if let Some(interned) = self.strings.lookup(text) {
            return Some(interned);
        }
        let encoded = self.cache.encode(text);
        let growth = Growth {
            strings: 1,
            string_bytes: encoded.len(),
            ..Growth::command(Opcode::DefString)
        };
        if !self.admit(growth) {
            return None;
        }
        let interned = self.strings.insert(text, &encoded);
        self.push_definition(
            Opcode::DefString,
            interned.id,
            interned.byte_off,
            interned.byte_len,
        );
        Some(interned)
    }

    fn push_blob(&mut self, bytes: &[u8]) -> Option<u32> {
        let growth = Growth {
            blobs: 1,
            blob_bytes: bytes.len(),
            ..Growth::command(Opcode::DefBlob)
        };
        if !self.admit(growth) {
            return None;
        }
        let byte_off = len_u32(self.blob_pool.len());
        let byte_len = len_u32(bytes.len());
        self.blob_pool.put_slice(bytes);
        pad4(&mut self.blob_pool);
        self.blob_spans.push((byte_off, byte_len));
        self.blob_bytes += bytes.len();
        let index = len_u32(self.blob_spans.len() - 1);
        self.push_definition(Opcode::DefBlob, index, byte_off, byte_len);
        Some(index)
    }
}

fn total(current: usize, growth: usize) -> u64 {
    (current as u64).saturating_add(growth as u64)
}

fn align4_u64(len: u64) -> u64 {
    len.saturating_add(3) & !3
}

fn put_rect(buf: &mut BytesMut, x: i32, y: i32, w: i32, h: i32) {
    buf.put_i32_le(x);
    buf.put_i32_le(y);
    buf.put_i32_le(w);
    buf.put_i32_le(h);
}
