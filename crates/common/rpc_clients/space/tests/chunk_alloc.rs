use bytes::Bytes;
use codec_common::{MessageCodec, MessageFrame, MessageHeaderTrait};
use data_types::TraceId;
use futures::{SinkExt, StreamExt};
use prost::Message;
use rpc_client_space::RpcClientSpace;
use space_codec::{
    AllocateS3ChunkRequest, AllocateS3ChunkResponse, Command, MessageHeader, SpaceStatusCode,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

/// Fake space allocator handing out sequential chunk ids.
async fn spawn_space_server(status: SpaceStatusCode) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, MessageCodec::<MessageHeader>::default());
        let mut next_chunk_id = 100u64;
        while let Some(Ok(frame)) = framed.next().await {
            assert_eq!(frame.header.command, Command::AllocateS3Chunk);
            let req = AllocateS3ChunkRequest::decode(frame.body).unwrap();
            assert_eq!(req.fs_id, 1);

            let body = AllocateS3ChunkResponse {
                status: status as i32,
                chunk_id: next_chunk_id,
            }
            .encode_to_vec();
            next_chunk_id += 1;
            let mut header = MessageHeader::new(Command::AllocateS3Chunk);
            header.set_id(frame.header.get_id());
            header.set_size((MessageHeader::SIZE + body.len()) as u32);
            header.set_body_checksum(&body);
            header.set_checksum();
            if framed
                .send(MessageFrame::new(header, Bytes::from(body)))
                .await
                .is_err()
            {
                break;
            }
        }
    });
    addr
}

#[tokio::test]
async fn allocations_return_distinct_ids() {
    let addr = spawn_space_server(SpaceStatusCode::Ok).await;
    let client = RpcClientSpace::new_from_address(addr, Duration::from_secs(1));

    let first = client
        .allocate_s3_chunk(1, Some(Duration::from_secs(1)), &TraceId::new())
        .await
        .unwrap();
    let second = client
        .allocate_s3_chunk(1, Some(Duration::from_secs(1)), &TraceId::new())
        .await
        .unwrap();
    assert_eq!(first.status, SpaceStatusCode::Ok as i32);
    assert_eq!(first.chunk_id, 100);
    assert_eq!(second.chunk_id, 101);
}

#[tokio::test]
async fn exhausted_space_status_is_passed_through() {
    let addr = spawn_space_server(SpaceStatusCode::NoSpace).await;
    let client = RpcClientSpace::new_from_address(addr, Duration::from_secs(1));

    let resp = client
        .allocate_s3_chunk(1, Some(Duration::from_secs(1)), &TraceId::new())
        .await
        .unwrap();
    assert_eq!(resp.status, SpaceStatusCode::NoSpace as i32);
}
