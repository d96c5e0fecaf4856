//! External service capabilities: inode version bumps and chunk id
//! allocation. The adaptor core talks to these traits only; production
//! wiring goes through the RPC-backed endpoints below, tests inject
//! in-memory fakes.

use crate::config::Config;
use crate::error::ServiceError;
use data_types::TraceId;
use meta_codec::MetaStatusCode;
use rpc_client_meta::RpcClientMeta;
use rpc_client_space::RpcClientSpace;
use space_codec::SpaceStatusCode;
use std::time::Duration;
use tracing::warn;

#[allow(async_fn_in_trait)]
pub trait MetaServerClient: Send + Sync {
    /// Bump the inode's S3 object generation; returns the new version.
    async fn update_inode_s3_version(
        &self,
        fs_id: u32,
        inode_id: u64,
        trace_id: &TraceId,
    ) -> Result<u64, ServiceError>;
}

#[allow(async_fn_in_trait)]
pub trait SpaceAllocClient: Send + Sync {
    /// Allocate a fresh chunk id for the filesystem.
    async fn allocate_s3_chunk(&self, fs_id: u32, trace_id: &TraceId)
    -> Result<u64, ServiceError>;
}

/// Metadata service reached over RPC at the configured endpoint.
pub struct MetaServerEndpoint {
    client: RpcClientMeta,
    timeout: Duration,
}

impl MetaServerEndpoint {
    pub fn new(config: &Config) -> Self {
        Self {
            client: RpcClientMeta::new_from_address(
                config.meta_server_eps.clone(),
                config.connect_timeout(),
            ),
            timeout: config.rpc_timeout(),
        }
    }
}

impl MetaServerClient for MetaServerEndpoint {
    async fn update_inode_s3_version(
        &self,
        fs_id: u32,
        inode_id: u64,
        trace_id: &TraceId,
    ) -> Result<u64, ServiceError> {
        let resp = self
            .client
            .update_inode_s3_version(fs_id, inode_id, Some(self.timeout), trace_id)
            .await?;
        if resp.status_code != MetaStatusCode::Ok as i32 {
            warn!(%trace_id, fs_id, inode_id, status = resp.status_code, "inode version update rejected");
            return Err(ServiceError::Status(resp.status_code));
        }
        Ok(resp.version)
    }
}

/// Space allocator reached over RPC at the configured endpoint.
pub struct SpaceAllocEndpoint {
    client: RpcClientSpace,
    timeout: Duration,
}

impl SpaceAllocEndpoint {
    pub fn new(config: &Config) -> Self {
        Self {
            client: RpcClientSpace::new_from_address(
                config.allocate_server_eps.clone(),
                config.connect_timeout(),
            ),
            timeout: config.rpc_timeout(),
        }
    }
}

impl SpaceAllocClient for SpaceAllocEndpoint {
    async fn allocate_s3_chunk(
        &self,
        fs_id: u32,
        trace_id: &TraceId,
    ) -> Result<u64, ServiceError> {
        let resp = self
            .client
            .allocate_s3_chunk(fs_id, Some(self.timeout), trace_id)
            .await?;
        if resp.status != SpaceStatusCode::Ok as i32 {
            warn!(%trace_id, fs_id, status = resp.status, "chunk id allocation rejected");
            return Err(ServiceError::Status(resp.status));
        }
        Ok(resp.chunk_id)
    }
}
