//! Iteration over a stream of concatenated size-prefixed buffers.

use crate::err::{DeserializationError, DeserializationResult};
use crate::settings::ReaderSettings;
use crate::size_prefix::{self, SIZE_PREFIX_LENGTH};
use crate::utils::bytes;

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace, warn};
use serde::Serialize;
use std::io::{self, Read};

/// A frame borrowed from an in-memory buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    pub index: usize,
    /// Position of the size prefix.
    pub offset: usize,
    pub size: usize,
    pub payload: &'a [u8],
}

/// A frame read from a stream, owning its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub offset: u64,
    pub size: usize,
    pub payload: Vec<u8>,
}

/// Location of a frame, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    pub offset: u64,
    pub size: usize,
    pub payload_offset: u64,
}

impl FrameSummary {
    fn new(index: usize, offset: u64, size: usize) -> Self {
        FrameSummary {
            index,
            offset,
            size,
            payload_offset: offset + SIZE_PREFIX_LENGTH as u64,
        }
    }
}

impl FrameRef<'_> {
    pub fn summary(&self) -> FrameSummary {
        FrameSummary::new(self.index, self.offset as u64, self.size)
    }
}

impl Frame {
    pub fn summary(&self) -> FrameSummary {
        FrameSummary::new(self.index, self.offset, self.size)
    }
}

fn check_limit(settings: &ReaderSettings, offset: u64, size: usize) -> DeserializationResult<()> {
    match settings.get_max_frame_size() {
        Some(limit) if size > limit => {
            warn!(
                "Frame at offset {} declares {} bytes, over the limit of {}",
                offset, size, limit
            );
            Err(DeserializationError::FrameTooLarge {
                offset,
                size,
                limit,
            })
        }
        _ => Ok(()),
    }
}

fn reached_max_frames(settings: &ReaderSettings, index: usize) -> bool {
    settings.get_max_frames().is_some_and(|max| index >= max)
}

/// Zero-copy iterator over the frames of an in-memory buffer.
///
/// Iteration ends when the cursor lands exactly on the end of the buffer. After the first error
/// nothing more is yielded, since a broken prefix leaves no way to find the next frame.
#[derive(Debug, Clone)]
pub struct FrameIter<'a> {
    buf: &'a [u8],
    pos: usize,
    index: usize,
    settings: ReaderSettings,
    done: bool,
}

impl<'a> FrameIter<'a> {
    pub fn new(buf: &'a [u8], settings: ReaderSettings) -> Self {
        FrameIter {
            buf,
            pos: settings.get_start_offset(),
            index: 0,
            settings,
            done: false,
        }
    }

    /// Offset of the next size prefix.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_frame(&mut self) -> DeserializationResult<FrameRef<'a>> {
        let offset = self.pos;
        let size = size_prefix::checked_size(self.buf, offset)?;
        check_limit(&self.settings, offset as u64, size)?;

        let payload = size_prefix::size_prefixed_payload(self.buf, offset)?;
        let (_, payload_offset) = size_prefix::remove_size_prefix(self.buf, offset);

        self.pos = payload_offset + size;

        Ok(FrameRef {
            index: self.index,
            offset,
            size,
            payload,
        })
    }
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = DeserializationResult<FrameRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if reached_max_frames(&self.settings, self.index) {
            debug!("Stopping after {} frames", self.index);
            self.done = true;
            return None;
        }

        if self.pos == self.buf.len() {
            debug!("Reached end of buffer after {} frames", self.index);
            self.done = true;
            return None;
        }

        if self.pos > self.buf.len() {
            self.done = true;
            return Some(Err(bytes::truncated(
                "size prefix",
                self.pos,
                SIZE_PREFIX_LENGTH,
                self.buf.len(),
            )));
        }

        match self.next_frame() {
            Ok(frame) => {
                trace!(
                    "Frame {} at offset {}: {} bytes",
                    frame.index, frame.offset, frame.size
                );
                self.index += 1;
                Some(Ok(frame))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

const READ_CHUNK_HINT: usize = 64 * 1024;

/// Reads frames from any `Read` source, one allocation per payload.
///
/// `start_offset` from the settings is skipped by reading and discarding that many bytes.
pub struct FrameReader<R: Read> {
    inner: R,
    pos: u64,
    index: usize,
    settings: ReaderSettings,
    skipped_to_start: bool,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, settings: ReaderSettings) -> Self {
        FrameReader {
            inner,
            pos: 0,
            index: 0,
            settings,
            skipped_to_start: false,
            done: false,
        }
    }

    /// Number of bytes consumed from the underlying reader so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn skip_to_start(&mut self) -> DeserializationResult<()> {
        let start = self.settings.get_start_offset() as u64;
        let skipped = io::copy(&mut (&mut self.inner).take(start), &mut io::sink())
            .map_err(|source| DeserializationError::FailedToRead { offset: 0, source })?;

        self.pos = skipped;
        if skipped < start {
            return Err(DeserializationError::Truncated {
                what: "start offset",
                offset: skipped,
                need: (start - skipped) as usize,
                have: 0,
            });
        }

        Ok(())
    }

    /// Reads the 4 prefix bytes. `Ok(None)` means the stream ended cleanly before the prefix.
    fn read_prefix(&mut self) -> DeserializationResult<Option<i32>> {
        let mut prefix = [0_u8; SIZE_PREFIX_LENGTH];
        let mut filled = 0;

        while filled < prefix.len() {
            match self.inner.read(&mut prefix[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DeserializationError::FailedToRead {
                        offset: self.pos,
                        source,
                    });
                }
            }
        }

        match filled {
            0 => Ok(None),
            n if n < SIZE_PREFIX_LENGTH => Err(DeserializationError::Truncated {
                what: "size prefix",
                offset: self.pos,
                need: SIZE_PREFIX_LENGTH,
                have: n,
            }),
            _ => Ok(Some((&prefix[..]).read_i32::<LittleEndian>().map_err(
                |source| DeserializationError::FailedToRead {
                    offset: self.pos,
                    source,
                },
            )?)),
        }
    }

    fn next_frame(&mut self) -> DeserializationResult<Option<Frame>> {
        let offset = self.pos;
        let value = match self.read_prefix()? {
            Some(value) => value,
            None => return Ok(None),
        };

        let size = usize::try_from(value)
            .map_err(|_| DeserializationError::NegativeSizePrefix { offset, value })?;
        check_limit(&self.settings, offset, size)?;

        let payload_offset = offset + SIZE_PREFIX_LENGTH as u64;
        // Grow with the data actually read rather than trusting the prefix up front.
        let mut payload = Vec::with_capacity(size.min(READ_CHUNK_HINT));
        let read = (&mut self.inner)
            .take(size as u64)
            .read_to_end(&mut payload)
            .map_err(|source| DeserializationError::FailedToRead {
                offset: payload_offset,
                source,
            })?;

        if read < size {
            return Err(DeserializationError::SizePrefixOutOfBounds {
                offset,
                size,
                available: read,
            });
        }

        self.pos = payload_offset + size as u64;

        Ok(Some(Frame {
            index: self.index,
            offset,
            size,
            payload,
        }))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = DeserializationResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.skipped_to_start {
            self.skipped_to_start = true;
            if let Err(e) = self.skip_to_start() {
                self.done = true;
                return Some(Err(e));
            }
        }

        if reached_max_frames(&self.settings, self.index) {
            debug!("Stopping after {} frames", self.index);
            self.done = true;
            return None;
        }

        match self.next_frame() {
            Ok(Some(frame)) => {
                trace!(
                    "Frame {} at offset {}: {} bytes",
                    frame.index, frame.offset, frame.size
                );
                self.index += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                debug!("Reached end of stream after {} frames", self.index);
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
