//! Client-side address-space translator for a distributed filesystem that
//! persists file data as immutable, versioned objects in an S3-compatible
//! store.
//!
//! Logical I/O at `(offset, length)` is mapped onto chunks of size `C` and
//! blocks of size `B` within each chunk, materialized as store objects keyed
//! by `(chunk_id, block_index, version)`. The adaptor also maintains the
//! inode's chunk index so reads can reconstruct the latest logical content
//! from overlapping writes.

mod adaptor;
pub mod chunk;
mod config;
mod error;
mod rpc;
mod store;

pub use adaptor::S3ClientAdaptor;
pub use config::Config;
pub use error::{AdaptorError, ServiceError};
pub use rpc::{MetaServerClient, MetaServerEndpoint, SpaceAllocClient, SpaceAllocEndpoint};
pub use store::{ObjectClient, object_name};
