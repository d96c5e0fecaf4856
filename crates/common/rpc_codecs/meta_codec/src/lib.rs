//! Metadata-service message format: inode S3 version bump.

mod message;
mod proto;

pub use message::{Command, MessageHeader};
pub use proto::{MetaStatusCode, UpdateInodeS3VersionRequest, UpdateInodeS3VersionResponse};
