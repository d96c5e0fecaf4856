use serde::{Deserialize, Serialize};

/// One contiguous valid logical byte range of an inode, backed by the
/// objects of a single `(chunk_id, version)`.
///
/// `size` mirrors `len` for wire compatibility with the metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3ChunkInfo {
    pub chunk_id: u64,
    pub version: u64,
    pub offset: u64,
    pub len: u64,
    pub size: u64,
}

impl S3ChunkInfo {
    pub fn new(chunk_id: u64, version: u64, offset: u64, len: u64) -> Self {
        Self {
            chunk_id,
            version,
            offset,
            len,
            size: len,
        }
    }

    /// Exclusive end offset of the range.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Client-side view of a file. The chunk index (`s3_chunks`) is kept in
/// insertion order: a later entry shadows earlier ones wherever they
/// overlap, so readers must not reorder it.
///
/// `length` is maintained by the layer above; the adaptor only appends to
/// `s3_chunks` and advances `version`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inode {
    pub fs_id: u32,
    pub inode_id: u64,
    pub length: u64,
    pub version: u64,
    pub s3_chunks: Vec<S3ChunkInfo>,
}

impl Inode {
    pub fn new(fs_id: u32, inode_id: u64) -> Self {
        Self {
            fs_id,
            inode_id,
            ..Default::default()
        }
    }
}
