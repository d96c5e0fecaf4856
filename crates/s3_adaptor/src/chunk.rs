//! Interval algebra over the inode chunk index.
//!
//! The index is an insertion-ordered list of [`S3ChunkInfo`] ranges; a later
//! entry shadows any earlier entry it overlaps. Everything here is pure list
//! manipulation; the adaptor decides when to call what.

use data_types::{Inode, S3ChunkInfo};

/// True iff `[offset, offset + length)` intersects any indexed range.
pub fn is_overlap(chunks: &[S3ChunkInfo], offset: u64, length: u64) -> bool {
    chunks
        .iter()
        .any(|e| offset < e.end() && e.offset < offset + length)
}

/// True iff the write starting at `offset` continues an existing range
/// mid-block, so the store's `Append` can extend that block's object in
/// place. A block-aligned continuation starts a fresh object instead.
///
/// Callers must have ruled out overlap first.
pub fn is_append_block(
    chunks: &[S3ChunkInfo],
    offset: u64,
    length: u64,
    block_size: u64,
) -> bool {
    debug_assert!(!is_overlap(chunks, offset, length));
    chunks
        .iter()
        .any(|e| e.end() == offset && offset % block_size != 0)
}

/// Geometry of a newer range against an older one it overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlapCase {
    /// Newer range begins inside the older one and reaches (or passes) its end.
    CutsTail,
    /// Newer range lies strictly inside the older one.
    SplitsMiddle,
    /// Newer range covers the older one entirely.
    Covers,
    /// Newer range covers the older one's head only.
    CutsHead,
}

fn classify(new: &S3ChunkInfo, old: &S3ChunkInfo) -> OverlapCase {
    if new.offset > old.offset {
        if new.end() >= old.end() {
            OverlapCase::CutsTail
        } else {
            OverlapCase::SplitsMiddle
        }
    } else if new.end() >= old.end() {
        OverlapCase::Covers
    } else {
        OverlapCase::CutsHead
    }
}

fn fragment(old: &S3ChunkInfo, offset: u64, len: u64) -> S3ChunkInfo {
    S3ChunkInfo::new(old.chunk_id, old.version, offset, len)
}

/// Fragments of `old` still visible after `new` shadows it. `new` must
/// overlap `old` and must not be older than it.
pub fn cut_overlap(new: &S3ChunkInfo, old: &S3ChunkInfo) -> Vec<S3ChunkInfo> {
    debug_assert!(new.version >= old.version);
    debug_assert!(new.offset < old.end() && old.offset < new.end());
    match classify(new, old) {
        OverlapCase::CutsTail => vec![fragment(old, old.offset, new.offset - old.offset)],
        OverlapCase::SplitsMiddle => vec![
            fragment(old, old.offset, new.offset - old.offset),
            fragment(old, new.end(), old.end() - new.end()),
        ],
        OverlapCase::Covers => Vec::new(),
        OverlapCase::CutsHead => vec![fragment(old, new.end(), old.end() - new.end())],
    }
}

/// Reconcile the chunk index into non-overlapping ranges whose union equals
/// the union of the originals, every byte attributed to its latest writer.
/// Entries are visited in insertion order, so each entry may cut any earlier
/// entry it overlaps (insertion order implies non-decreasing version on
/// overlapping ranges).
pub fn effective_chunks(inode: &Inode) -> Vec<S3ChunkInfo> {
    let mut working: Vec<S3ChunkInfo> = Vec::new();
    for entry in &inode.s3_chunks {
        let mut next = Vec::with_capacity(working.len() + 1);
        for old in &working {
            if entry.offset < old.end() && old.offset < entry.end() {
                next.extend(cut_overlap(entry, old));
            } else {
                next.push(old.clone());
            }
        }
        next.push(entry.clone());
        working = next;
    }
    working
}

/// Merge one written range into the chunk index: the first entry with the
/// same `(chunk_id, version)` ending exactly where the range begins is
/// extended in place, otherwise a new entry is appended. Coalescing is
/// right-contiguous only.
pub fn merge_entry(
    chunks: &mut Vec<S3ChunkInfo>,
    chunk_id: u64,
    version: u64,
    offset: u64,
    len: u64,
) {
    for entry in chunks.iter_mut() {
        if entry.chunk_id == chunk_id && entry.version == version && entry.end() == offset {
            entry.len += len;
            entry.size = entry.len;
            return;
        }
    }
    chunks.push(S3ChunkInfo::new(chunk_id, version, offset, len));
}
