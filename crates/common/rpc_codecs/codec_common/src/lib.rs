use bytes::{Buf, Bytes, BytesMut};
use data_types::TraceId;
use tokio_util::codec::{Decoder, Encoder};

mod protobuf_header;
pub use protobuf_header::{EMPTY_BODY_CHECKSUM, ProtobufMessageHeader};

pub trait MessageHeaderTrait: Sized + Clone + Copy + Send + Sync + 'static {
    const SIZE: usize;

    fn encode(&self, dst: &mut BytesMut);
    fn decode(src: &[u8]) -> Self;
    fn get_size(&self) -> usize;
    fn set_size(&mut self, size: u32);
    fn get_id(&self) -> u32;
    fn set_id(&mut self, id: u32);
    fn get_body_size(&self) -> usize {
        self.get_size().saturating_sub(Self::SIZE)
    }
    fn get_trace_id(&self) -> TraceId;
    fn set_trace_id(&mut self, trace_id: &TraceId);
    fn set_checksum(&mut self);
    fn verify_checksum(&self) -> bool;
    fn set_body_checksum(&mut self, body: &[u8]);
    fn verify_body_checksum(&self, body: &[u8]) -> bool;
}

#[derive(Debug)]
pub struct MessageFrame<H: MessageHeaderTrait, B = Bytes> {
    pub header: H,
    pub body: B,
}

impl<H: MessageHeaderTrait, B> MessageFrame<H, B> {
    pub fn new(header: H, body: B) -> Self {
        Self { header, body }
    }
}

#[derive(Clone)]
pub struct MessageCodec<H: MessageHeaderTrait> {
    _phantom: std::marker::PhantomData<H>,
}

impl<H: MessageHeaderTrait> Default for MessageCodec<H> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

const MAX: usize = 2 * 1024 * 1024;

impl<H: MessageHeaderTrait> Decoder for MessageCodec<H> {
    type Item = MessageFrame<H>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header_size = H::SIZE;
        if src.len() < header_size {
            return Ok(None);
        }

        let header = H::decode(&src[..header_size]);
        if !header.verify_checksum() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Header checksum mismatch",
            ));
        }

        let size = header.get_size();
        if size < header_size {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Frame size {size} is smaller than header size {header_size}"),
            ));
        }
        if size > MAX {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Frame of size {size} is too large."),
            ));
        }

        if src.len() < size {
            src.reserve(size - src.len());
            return Ok(None);
        }

        // Extract body as Bytes (zero-copy from BytesMut)
        src.advance(header_size);
        let body = src.split_to(size - header_size).freeze();

        Ok(Some(MessageFrame::new(header, body)))
    }
}

impl<H: MessageHeaderTrait> Encoder<MessageFrame<H>> for MessageCodec<H> {
    type Error = std::io::Error;

    fn encode(&mut self, frame: MessageFrame<H>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(H::SIZE + frame.body.len());
        frame.header.encode(dst);
        dst.extend_from_slice(&frame.body);
        Ok(())
    }
}
