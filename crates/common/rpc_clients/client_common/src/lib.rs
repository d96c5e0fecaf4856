//! Request/response RPC client shared by the per-service clients.
//!
//! One TCP connection per client, established on first use. Requests are
//! serialized: the connection is held under a mutex for the whole
//! roundtrip, so at most one request is in flight per client. A failed
//! roundtrip discards the connection; the next request reconnects. Retry
//! policy belongs to the caller, not this layer.

use codec_common::{MessageCodec, MessageFrame, MessageHeaderTrait};
use futures::{SinkExt, StreamExt};
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::Framed;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("connect to {address} failed: {source}")]
    Connect {
        address: String,
        source: io::Error,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("response id mismatch: sent {sent}, got {got}")]
    IdMismatch { sent: u32, got: u32 },

    #[error("response body checksum mismatch")]
    BodyChecksumMismatch,
}

impl RpcError {
    /// Whether a higher layer could reasonably retry the request.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            RpcError::Connect { .. }
                | RpcError::Timeout(_)
                | RpcError::Io(_)
                | RpcError::ConnectionClosed
        )
    }
}

pub struct RpcClient<H: MessageHeaderTrait> {
    address: String,
    connect_timeout: Duration,
    connection: Mutex<Option<Framed<TcpStream, MessageCodec<H>>>>,
    next_request_id: AtomicU32,
}

impl<H: MessageHeaderTrait> RpcClient<H> {
    pub fn new_from_address(address: String, connect_timeout: Duration) -> Self {
        Self {
            address,
            connect_timeout,
            connection: Mutex::new(None),
            next_request_id: AtomicU32::new(1),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn gen_request_id(&self) -> u32 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send one frame and wait for its response. The response must carry the
    /// request's id and a valid body checksum.
    pub async fn send_request(
        &self,
        frame: MessageFrame<H>,
        timeout: Option<Duration>,
    ) -> Result<MessageFrame<H>, RpcError> {
        let request_id = frame.header.get_id();

        let mut guard = self.connection.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => self.connect().await?,
        };

        let result = match timeout {
            Some(t) => match tokio::time::timeout(t, Self::roundtrip(&mut conn, frame)).await {
                Ok(result) => result,
                Err(_) => Err(RpcError::Timeout(t)),
            },
            None => Self::roundtrip(&mut conn, frame).await,
        };

        let result = result.and_then(|resp| {
            let got = resp.header.get_id();
            if got != request_id {
                return Err(RpcError::IdMismatch {
                    sent: request_id,
                    got,
                });
            }
            if !resp.header.verify_body_checksum(&resp.body) {
                return Err(RpcError::BodyChecksumMismatch);
            }
            Ok(resp)
        });

        // Only a connection that completed a clean roundtrip is reused; an
        // error of any kind may leave unread bytes on the wire.
        if result.is_ok() {
            *guard = Some(conn);
        }
        result
    }

    async fn connect(&self) -> Result<Framed<TcpStream, MessageCodec<H>>, RpcError> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| RpcError::Connect {
                address: self.address.clone(),
                source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
            })?
            .map_err(|e| RpcError::Connect {
                address: self.address.clone(),
                source: e,
            })?;
        let _ = stream.set_nodelay(true);
        debug!(address = %self.address, "rpc connection established");
        Ok(Framed::new(stream, MessageCodec::default()))
    }

    async fn roundtrip(
        conn: &mut Framed<TcpStream, MessageCodec<H>>,
        frame: MessageFrame<H>,
    ) -> Result<MessageFrame<H>, RpcError> {
        conn.send(frame).await?;
        match conn.next().await {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(e)) => Err(RpcError::Io(e)),
            None => Err(RpcError::ConnectionClosed),
        }
    }
}
