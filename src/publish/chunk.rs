/// Smallest allowed non-final chunk.
pub const MIN_CHUNK_SIZE: u64 = 5 * 1024 * 1024;
/// Largest allowed chunk.
pub const MAX_CHUNK_SIZE: u64 = 64 * 1024 * 1024;

/// Chunk layout announced in the upload init request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkParams {
    pub video_size: u64,
    pub chunk_size: u64,
    pub total_chunk_count: u64,
}

/// Inclusive byte range of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn size(self) -> u64 {
        self.end - self.start + 1
    }
}

/// One chunk of the whole file when it fits, else maximal chunks with a short tail.
pub fn compute_chunk_params(video_size: u64) -> ChunkParams {
    if video_size <= MAX_CHUNK_SIZE {
        ChunkParams {
            video_size,
            chunk_size: video_size,
            total_chunk_count: 1,
        }
    } else {
        ChunkParams {
            video_size,
            chunk_size: MAX_CHUNK_SIZE,
            total_chunk_count: video_size.div_ceil(MAX_CHUNK_SIZE),
        }
    }
}

impl ChunkParams {
    /// Byte ranges in upload order; empty for an empty file.
    pub fn ranges(&self) -> Vec<ByteRange> {
        if self.video_size == 0 {
            return Vec::new();
        }
        (0..self.total_chunk_count)
            .map(|i| {
                let start = i * self.chunk_size;
                let end = (start + self.chunk_size).min(self.video_size) - 1;
                ByteRange { start, end }
            })
            .collect()
    }

    /// Whether every chunk but the last meets [`MIN_CHUNK_SIZE`].
    pub fn non_final_chunks_valid(&self) -> bool {
        let ranges = self.ranges();
        let n = ranges.len();
        ranges
            .iter()
            .take(n.saturating_sub(1))
            .all(|r| r.size() >= MIN_CHUNK_SIZE && r.size() <= MAX_CHUNK_SIZE)
    }
}

/// `Content-Range` header value for `range` of a `total`-byte upload.
pub fn content_range(range: ByteRange, total: u64) -> String {
    format!("bytes {}-{}/{}", range.start, range.end, total)
}

#[cfg(test)]
#[path = "../../tests/unit/publish/chunk.rs"]
mod tests;
