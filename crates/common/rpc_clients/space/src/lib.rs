//! Space-allocator client: S3 chunk id allocation.

use bytes::Bytes;
use codec_common::{MessageFrame, MessageHeaderTrait};
use data_types::TraceId;
use prost::Message as PbMessage;
use rpc_client_common::{RpcClient, RpcError};
use space_codec::{AllocateS3ChunkRequest, AllocateS3ChunkResponse, Command, MessageHeader};
use std::time::Duration;
use tracing::error;

pub struct RpcClientSpace {
    client: RpcClient<MessageHeader>,
}

impl RpcClientSpace {
    pub fn new_from_address(address: String, connect_timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_from_address(address, connect_timeout),
        }
    }

    /// Allocate a new chunk id for the filesystem. Status interpretation is
    /// left to the caller.
    pub async fn allocate_s3_chunk(
        &self,
        fs_id: u32,
        timeout: Option<Duration>,
        trace_id: &TraceId,
    ) -> Result<AllocateS3ChunkResponse, RpcError> {
        let body = AllocateS3ChunkRequest { fs_id };

        let mut header = MessageHeader::new(Command::AllocateS3Chunk);
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
                    error!(rpc = %"allocate_s3_chunk", %request_id, %trace_id, fs_id, error = ?e, "space rpc failed");
                }
                e
            })?;
        let resp: AllocateS3ChunkResponse =
            PbMessage::decode(resp_frame.body).map_err(|e| RpcError::Decode(e.to_string()))?;
        Ok(resp)
    }
}
