//! Metadata-service client: per-inode S3 version bumps.

use bytes::Bytes;
use codec_common::{MessageFrame, MessageHeaderTrait};
use data_types::TraceId;
use meta_codec::{
    Command, MessageHeader, UpdateInodeS3VersionRequest, UpdateInodeS3VersionResponse,
};
use prost::Message as PbMessage;
use rpc_client_common::{RpcClient, RpcError};
use std::time::Duration;
use tracing::error;

pub struct RpcClientMeta {
    client: RpcClient<MessageHeader>,
}

impl RpcClientMeta {
    pub fn new_from_address(address: String, connect_timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_from_address(address, connect_timeout),
        }
    }

    /// Ask the metadata service for a fresh S3 object generation for the
    /// inode. Status interpretation is left to the caller.
    pub async fn update_inode_s3_version(
        &self,
        fs_id: u32,
        inode_id: u64,
        timeout: Option<Duration>,
        trace_id: &TraceId,
    ) -> Result<UpdateInodeS3VersionResponse, RpcError> {
        let body = UpdateInodeS3VersionRequest { inode_id, fs_id };

        let mut header = MessageHeader::new(Command::UpdateInodeS3Version);
        let request_id = self.client.gen_request_id();
        header.set_id(request_id);
        header.set_size((MessageHeader::SIZE + body.encoded_len()) as u32);
        header.set_trace_id(trace_id);

        let body_bytes = Bytes::from(body.encode_to_vec());
        header.set_body_checksum(&body_bytes);
        header.set_checksum();

        let frame = MessageFrame::new(header, body_bytes);
        let resp_frame = self
            .client
            .send_request(frame, timeout)
            .await
            .map_err(|e| {
                if !e.retryable() {
                    error!(rpc = %"update_inode_s3_version", %request_id, %trace_id, fs_id, inode_id, error = ?e, "meta rpc failed");
                }
                e
            })?;
        let resp: UpdateInodeS3VersionResponse =
            PbMessage::decode(resp_frame.body).map_err(|e| RpcError::Decode(e.to_string()))?;
        Ok(resp)
    }
}
