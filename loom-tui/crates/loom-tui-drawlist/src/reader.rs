//! Validating drawlist reader.

use crate::codec::Reader;
use crate::error::ParseError;
use crate::format::{
    Header, Opcode, PackedStyle, CMD_HEADER_SIZE, HEADER_SIZE, MAGIC, SPAN_SIZE, VERSION,
};
use crate::text_run::{self, TextRunEntry};

/// A decoded command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Command {
    Clear,
    FillRect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        style: PackedStyle,
    },
    DrawText {
        x: i32,
        y: i32,
        string_id: u32,
        byte_off: u32,
        byte_len: u32,
        style: PackedStyle,
    },
    PushClip {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    PopClip,
    DrawTextRun {
        x: i32,
        y: i32,
        blob_index: u32,
    },
    SetCursor {
        x: i32,
        y: i32,
        shape: u8,
        visible: bool,
        blink: bool,
    },
    DrawCanvas {
        x: i32,
        y: i32,
        cols: u32,
        rows: u32,
        px_width: u32,
        px_height: u32,
        blob_index: u32,
        blitter: u8,
    },
    DrawImage {
        x: i32,
        y: i32,
        cols: u32,
        rows: u32,
        px_width: u32,
        px_height: u32,
        blob_index: u32,
        image_id: u32,
        format: u8,
        protocol: u8,
        z_layer: i8,
        fit: u8,
    },
    DefString {
        id: u32,
        byte_off: u32,
        byte_len: u32,
    },
    DefBlob {
        index: u32,
        byte_off: u32,
        byte_len: u32,
    },
}

impl Command {
    /// Returns the opcode of this command.
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Clear => Opcode::Clear,
            Self::FillRect { .. } => Opcode::FillRect,
            Self::DrawText { .. } => Opcode::DrawText,
            Self::PushClip { .. } => Opcode::PushClip,
            Self::PopClip => Opcode::PopClip,
            Self::DrawTextRun { .. } => Opcode::DrawTextRun,
            Self::SetCursor { .. } => Opcode::SetCursor,
            Self::DrawCanvas { .. } => Opcode::DrawCanvas,
            Self::DrawImage { .. } => Opcode::DrawImage,
            Self::DefString { .. } => Opcode::DefString,
            Self::DefBlob { .. } => Opcode::DefBlob,
        }
    }
}

/// A command together with its framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
    /// Byte offset of the record in the buffer.
    pub offset: usize,
    /// Record size from the command header.
    pub size: u32,
    /// Flags from the command header.
    pub flags: u16,
    /// The decoded payload.
    pub command: Command,
}

/// A parsed, bounds-checked view over drawlist bytes.
///
/// Parsing validates the header, section bounds and alignment, every command
/// record, every string (as UTF-8) and every blob span up front, so the
/// accessors never fail.
#[derive(Debug, Clone)]
pub struct DrawlistView<'a> {
    bytes: &'a [u8],
    header: Header,
    records: Vec<CommandRecord>,
    strings: Vec<&'a str>,
    blobs: Vec<&'a [u8]>,
}

impl<'a> DrawlistView<'a> {
    /// Parses and validates `bytes`.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ParseError> {
        let header = Header::decode(bytes).ok_or(ParseError::Truncated {
            offset: 0,
            needed: HEADER_SIZE,
            len: bytes.len(),
        })?;
        if header.magic != MAGIC {
            return Err(ParseError::BadMagic(header.magic));
        }
        if header.version != VERSION {
            return Err(ParseError::UnsupportedVersion(header.version));
        }
        if header.header_size as usize != HEADER_SIZE {
            return Err(ParseError::BadHeaderSize(header.header_size));
        }
        if header.total_size as usize != bytes.len() {
            return Err(ParseError::SizeMismatch {
                declared: header.total_size,
                actual: bytes.len(),
            });
        }

        let reader = Reader::new(bytes);
        let records = parse_commands(&reader, &header)?;
        let strings = parse_table(
            &reader,
            "strings",
            header.strings_count,
            header.strings_span_offset,
            header.strings_bytes_offset,
            header.strings_bytes_len,
        )?
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            std::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8 {
                id: index as u32 + 1,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
        let blobs = parse_table(
            &reader,
            "blobs",
            header.blobs_count,
            header.blobs_span_offset,
            header.blobs_bytes_offset,
            header.blobs_bytes_len,
        )?;

        Ok(Self {
            bytes,
            header,
            records,
            strings,
            blobs,
        })
    }

    /// Returns the raw buffer.
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the command records in stream order.
    pub fn records(&self) -> &[CommandRecord] {
        &self.records
    }

    /// Iterates the decoded commands in stream order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.records.iter().map(|record| &record.command)
    }

    /// Iterates the commands, skipping `DEF_STRING` and `DEF_BLOB`.
    pub fn draw_commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands()
            .filter(|command| !matches!(command, Command::DefString { .. } | Command::DefBlob { .. }))
    }

    /// Returns the string with 1-based `id`.
    pub fn string(&self, id: u32) -> Option<&'a str> {
        let index = id.checked_sub(1)? as usize;
        self.strings.get(index).copied()
    }

    /// Returns every string in id order.
    pub fn strings(&self) -> &[&'a str] {
        &self.strings
    }

    /// Returns the blob at 0-based `index`.
    pub fn blob(&self, index: u32) -> Option<&'a [u8]> {
        self.blobs.get(index as usize).copied()
    }

    /// Returns the number of blobs.
    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    /// Decodes the text-run blob at `index`.
    pub fn text_run(&self, index: u32) -> Result<Vec<TextRunEntry>, ParseError> {
        let blob = self.blob(index).ok_or(ParseError::BadSpan {
            table: "blob",
            index: index as usize,
        })?;
        text_run::decode(blob).ok_or(ParseError::Truncated {
            offset: 0,
            needed: 4,
            len: blob.len(),
        })
    }

    /// Resolves the text drawn by a `DRAW_TEXT` command.
    pub fn text_of(&self, command: &Command) -> Option<&'a str> {
        let Command::DrawText {
            string_id,
            byte_off,
            byte_len,
            ..
        } = *command
        else {
            return None;
        };
        let text = self.string(string_id)?;
        let start = byte_off as usize;
        text.get(start..start.checked_add(byte_len as usize)?)
    }
}

/// Checks that `[offset, offset + len)` lies in the buffer and is aligned.
fn check_section(
    reader: &Reader<'_>,
    section: &'static str,
    offset: u32,
    len: usize,
) -> Result<(), ParseError> {
    let offset = offset as usize;
    if offset < HEADER_SIZE || offset % 4 != 0 || reader.slice(offset, len).is_none() {
        return Err(ParseError::BadSection { section });
    }
    Ok(())
}

fn parse_commands(reader: &Reader<'_>, header: &Header) -> Result<Vec<CommandRecord>, ParseError> {
    if header.cmd_count == 0 {
        if header.cmd_bytes != 0 || header.cmd_offset != 0 {
            return Err(ParseError::BadSection { section: "commands" });
        }
        return Ok(Vec::new());
    }
    let cmd_bytes = header.cmd_bytes as usize;
    check_section(reader, "commands", header.cmd_offset, cmd_bytes)?;
    // Every record is at least a command header long.
    if cmd_bytes % 4 != 0 || header.cmd_count as usize > cmd_bytes / CMD_HEADER_SIZE {
        return Err(ParseError::BadSection { section: "commands" });
    }

    let start = header.cmd_offset as usize;
    let end = start + cmd_bytes;
    let mut offset = start;
    let mut records = Vec::with_capacity(header.cmd_count as usize);
    for index in 0..header.cmd_count as usize {
        let bad = |reason: String| ParseError::BadCommand {
            index,
            offset,
            reason,
        };
        if offset + CMD_HEADER_SIZE > end {
            return Err(bad("record header past end of command stream".into()));
        }
        let opcode = reader.u16(offset).unwrap_or_default();
        let flags = reader.u16(offset + 2).unwrap_or_default();
        let size = reader.u32(offset + 4).unwrap_or_default();
        let size_usize = size as usize;
        if size_usize < CMD_HEADER_SIZE || size_usize % 4 != 0 || offset + size_usize > end {
            return Err(bad(format!("bad record size {size}")));
        }
        let op = Opcode::from_u16(opcode).ok_or_else(|| bad(format!("unknown opcode {opcode}")))?;
        if op.record_size() != size_usize {
            return Err(bad(format!(
                "{op:?} record is {size} bytes, expected {}",
                op.record_size()
            )));
        }
        let command = decode_command(reader, op, offset + CMD_HEADER_SIZE)
            .ok_or_else(|| bad("truncated payload".into()))?;
        records.push(CommandRecord {
            offset,
            size,
            flags,
            command,
        });
        offset += size_usize;
    }
    if offset != end {
        return Err(ParseError::BadSection { section: "commands" });
    }
    Ok(records)
}

fn decode_command(r: &Reader<'_>, op: Opcode, p: usize) -> Option<Command> {
    Some(match op {
        Opcode::Clear => Command::Clear,
        Opcode::PopClip => Command::PopClip,
        Opcode::FillRect => Command::FillRect {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            w: r.i32(p + 8)?,
            h: r.i32(p + 12)?,
            style: PackedStyle::decode(r, p + 16)?,
        },
        Opcode::DrawText => Command::DrawText {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            string_id: r.u32(p + 8)?,
            byte_off: r.u32(p + 12)?,
            byte_len: r.u32(p + 16)?,
            style: PackedStyle::decode(r, p + 20)?,
        },
        Opcode::PushClip => Command::PushClip {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            w: r.i32(p + 8)?,
            h: r.i32(p + 12)?,
        },
        Opcode::DrawTextRun => Command::DrawTextRun {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            blob_index: r.u32(p + 8)?,
        },
        Opcode::SetCursor => Command::SetCursor {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            shape: r.u8(p + 8)?,
            visible: r.u8(p + 9)? != 0,
            blink: r.u8(p + 10)? != 0,
        },
        Opcode::DrawCanvas => Command::DrawCanvas {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            cols: r.u32(p + 8)?,
            rows: r.u32(p + 12)?,
            px_width: r.u32(p + 16)?,
            px_height: r.u32(p + 20)?,
            blob_index: r.u32(p + 24)?,
            blitter: r.u8(p + 28)?,
        },
        Opcode::DrawImage => Command::DrawImage {
            x: r.i32(p)?,
            y: r.i32(p + 4)?,
            cols: r.u32(p + 8)?,
            rows: r.u32(p + 12)?,
            px_width: r.u32(p + 16)?,
            px_height: r.u32(p + 20)?,
            blob_index: r.u32(p + 24)?,
            image_id: r.u32(p + 28)?,
            format: r.u8(p + 32)?,
            protocol: r.u8(p + 33)?,
            z_layer: r.u8(p + 34)? as i8,
            fit: r.u8(p + 35)?,
        },
        Opcode::DefString => Command::DefString {
            id: r.u32(p)?,
            byte_off: r.u32(p + 4)?,
            byte_len: r.u32(p + 8)?,
        },
        Opcode::DefBlob => Command::DefBlob {
            index: r.u32(p)?,
            byte_off: r.u32(p + 4)?,
            byte_len: r.u32(p + 8)?,
        },
    })
}

/// Validates a span table and its pool, returning one slice per entry.
fn parse_table<'a>(
    reader: &Reader<'a>,
    section: &'static str,
    count: u32,
    span_offset: u32,
    pool_offset: u32,
    pool_len: u32,
) -> Result<Vec<&'a [u8]>, ParseError> {
    if count == 0 {
        if span_offset != 0 || pool_offset != 0 || pool_len != 0 {
            return Err(ParseError::BadSection { section });
        }
        return Ok(Vec::new());
    }
    let count = count as usize;
    let spans_len = count
        .checked_mul(SPAN_SIZE)
        .ok_or(ParseError::BadSection { section })?;
    check_section(reader, section, span_offset, spans_len)?;
    check_section(reader, section, pool_offset, pool_len as usize)?;
    if pool_len % 4 != 0 {
        return Err(ParseError::BadSection { section });
    }

    let pool = reader
        .slice(pool_offset as usize, pool_len as usize)
        .ok_or(ParseError::BadSection { section })?;
    let table = if section == "strings" { "string" } else { "blob" };
    (0..count)
        .map(|index| {
            let base = span_offset as usize + index * SPAN_SIZE;
            let byte_off = reader.u32(base).unwrap_or_default() as usize;
            let byte_len = reader.u32(base + 4).unwrap_or_default() as usize;
            byte_off
                .checked_add(byte_len)
                .and_then(|end| pool.get(byte_off..end))
                .ok_or(ParseError::BadSpan { table, index })
        })
        .collect()
}
