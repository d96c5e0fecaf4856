//! Space-allocator message format: S3 chunk id allocation.

mod message;
mod proto;

pub use message::{Command, MessageHeader};
pub use proto::{AllocateS3ChunkRequest, AllocateS3ChunkResponse, SpaceStatusCode};
