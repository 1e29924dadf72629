//! Fixed-length chunk ranges.

use std::ops::Range;

/// Iterator over contiguous frame ranges of `chunk_frames` frames.
///
/// The last range may be shorter. A `chunk_frames` of zero disables chunking
/// and yields the whole buffer as a single range, even when it is empty.
#[derive(Debug, Clone)]
pub struct ChunkRanges {
    total: usize,
    chunk_frames: usize,
    pos: usize,
    done: bool,
}

impl ChunkRanges {
    pub fn new(total: usize, chunk_frames: usize) -> Self {
        Self {
            total,
            chunk_frames,
            pos: 0,
            done: false,
        }
    }

    /// Returns the number of ranges this iterator yields from the start.
    pub fn count_total(&self) -> usize {
        if self.chunk_frames == 0 {
            1
        } else {
            self.total.div_ceil(self.chunk_frames)
        }
    }
}

impl Iterator for ChunkRanges {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.chunk_frames == 0 {
            self.done = true;
            return Some(0..self.total);
        }
        if self.pos >= self.total {
            self.done = true;
            return None;
        }
        let start = self.pos;
        let end = (start + self.chunk_frames).min(self.total);
        self.pos = end;
        Some(start..end)
    }
}
