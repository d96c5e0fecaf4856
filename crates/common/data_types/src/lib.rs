mod inode;
mod trace_id;

pub use inode::{Inode, S3ChunkInfo};
pub use trace_id::TraceId;
