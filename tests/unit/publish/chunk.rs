use super::*;

const MIB: u64 = 1024 * 1024;

#[test]
fn small_file_is_one_chunk() {
    let p = compute_chunk_params(10 * MIB);
    assert_eq!(p.chunk_size, 10 * MIB);
    assert_eq!(p.total_chunk_count, 1);
    assert_eq!(p.ranges(), vec![ByteRange { start: 0, end: 10 * MIB - 1 }]);
}

#[test]
fn exactly_max_is_one_chunk() {
    let p = compute_chunk_params(MAX_CHUNK_SIZE);
    assert_eq!(p.total_chunk_count, 1);
    assert_eq!(p.chunk_size, MAX_CHUNK_SIZE);
}

#[test]
fn large_file_uses_max_chunks_with_ceil_count() {
    let size = 130 * MIB + 7;
    let p = compute_chunk_params(size);
    assert_eq!(p.chunk_size, MAX_CHUNK_SIZE);
    assert_eq!(p.total_chunk_count, 3);

    let ranges = p.ranges();
    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[0], ByteRange { start: 0, end: MAX_CHUNK_SIZE - 1 });
    assert_eq!(ranges[2].end, size - 1);
    assert_eq!(ranges.iter().map(|r| r.size()).sum::<u64>(), size);
    assert!(p.non_final_chunks_valid());
}

#[test]
fn empty_file_has_no_ranges() {
    let p = compute_chunk_params(0);
    assert_eq!(p.total_chunk_count, 1);
    assert!(p.ranges().is_empty());
}

#[test]
fn content_range_is_inclusive() {
    assert_eq!(
        content_range(ByteRange { start: 0, end: 99 }, 100),
        "bytes 0-99/100"
    );
}
