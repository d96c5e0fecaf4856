use rpc_client_common::RpcError;
use std::io;
use thiserror::Error;

/// Failure of an external service call: either the transport failed or the
/// service answered with a non-OK status.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("rpc: {0}")]
    Rpc(#[from] RpcError),

    #[error("service status {0}")]
    Status(i32),
}

#[derive(Error, Debug)]
pub enum AdaptorError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("chunk id allocation failed: {0}")]
    ChunkAlloc(#[source] ServiceError),

    #[error("inode version update failed: {0}")]
    VersionUpdate(#[source] ServiceError),

    #[error("object store write failed for {name}: {source}")]
    StoreWrite {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("object store read failed for {name}: {source}")]
    StoreRead {
        name: String,
        #[source]
        source: io::Error,
    },
}
