//! Byte-level helpers for the object and layout containers.
//!
//! Both streams start with a table of big-endian 16-bit offsets, one per
//! stage. The first entry also marks where the table ends; a stage's data
//! runs from its offset up to the next stage's offset (or the end of the
//! stream for the last stage).

use crate::error::{FormatError, FormatResult, StreamKind};

/// Forward-only reader over one decoded stream.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    stream: StreamKind,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8], stream: StreamKind) -> Self {
        Self {
            data,
            pos: 0,
            stream,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn read_u8(&mut self) -> FormatResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(FormatError::UnexpectedEof {
            stream: self.stream,
            offset: self.pos,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_u16_be(&mut self) -> FormatResult<u16> {
        let hi = self.read_u8()?;
        let lo = self.read_u8()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }
}

/// A stage's byte range within one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StageSpan {
    pub start: usize,
    pub end: usize,
}

/// Reads the offset table at the start of a stream.
pub(crate) fn read_offset_table(
    reader: &mut ByteReader<'_>,
    len: usize,
) -> FormatResult<Vec<StageSpan>> {
    let stream = reader.stream;
    let invalid = |reason: String| FormatError::InvalidOffsetTable { stream, reason };

    let table_end = usize::from(reader.read_u16_be()?);
    if table_end % 2 != 0 {
        return Err(invalid(format!("table end {table_end} is odd")));
    }
    if table_end > len {
        return Err(invalid(format!(
            "table end {table_end} is past the stream end {len}"
        )));
    }

    let mut offsets = vec![table_end];
    while reader.position() < table_end {
        offsets.push(usize::from(reader.read_u16_be()?));
    }

    let mut spans = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(len);
        if start > end || end > len {
            return Err(invalid(format!(
                "stage {i} spans {start}..{end} in a stream of {len} bytes"
            )));
        }
        spans.push(StageSpan { start, end });
    }
    Ok(spans)
}

/// Appends a big-endian table entry, failing if it does not fit in 16 bits.
pub(crate) fn write_offset(
    out: &mut Vec<u8>,
    offset: usize,
    stream: StreamKind,
) -> FormatResult<()> {
    let value = u16::try_from(offset).map_err(|_| FormatError::StreamTooLarge { stream, offset })?;
    out.extend_from_slice(&value.to_be_bytes());
    Ok(())
}
