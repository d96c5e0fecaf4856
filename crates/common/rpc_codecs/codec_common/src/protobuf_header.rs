use bytemuck::{Pod, Zeroable};
use bytes::{BufMut, BytesMut};
use data_types::TraceId;
use xxhash_rust::xxh3::xxh3_64;

use crate::MessageHeaderTrait;

/// XXH3-64 hash of an empty buffer (seed=0)
/// This is the correct checksum value for empty message bodies
pub const EMPTY_BODY_CHECKSUM: u64 = 0x2d06800538d394c2;

/// Generic header for protobuf-bodied RPC protocols.
///
/// The Command type must be an i32-repr enum that implements Pod and
/// Zeroable; each service crate supplies its own and aliases
/// `MessageHeader = ProtobufMessageHeader<Command>`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ProtobufMessageHeader<Command>
where
    Command: Pod + Send + Sync,
{
    /// A checksum covering only the remainder of this header.
    /// This allows the header to be trusted without having to recv() or read() the associated body.
    pub checksum: u64,
    /// The current protocol version, note the position should never be changed
    /// so that we can upgrade proto version in the future.
    pub proto_version: u8,
    /// Reserved for future use
    pub _reserved0: [u8; 3],
    /// The size of the Header structure, plus any associated body.
    pub size: u32,

    /// A checksum covering only the associated body after this header.
    pub checksum_body: u64,
    /// Every request would be sent with a unique id, so the client can get the right response
    pub id: u32,
    /// The protocol command (method) for this message.
    pub command: Command,

    /// Trace ID for distributed tracing
    pub trace_id: u64,
    pub _reserved1: u64,
}

// Safety: when Command implements Pod (valid for any bit pattern) and all
// other fields are Pod primitives, the whole repr(C) struct has no padding
// and is itself Pod.
unsafe impl<Command> Pod for ProtobufMessageHeader<Command> where Command: Pod + Send + Sync {}

// Safety: all-zero is a valid value for every field, Command included
// (Command: Pod implies Zeroable).
unsafe impl<Command> Zeroable for ProtobufMessageHeader<Command> where Command: Pod + Send + Sync {}

impl<Command> ProtobufMessageHeader<Command>
where
    Command: Pod + Send + Sync,
{
    const _SIZE_OK: () = assert!(size_of::<Self>() == 48);

    pub const PROTO_VERSION: u8 = 1;

    pub fn new(command: Command) -> Self {
        Self {
            proto_version: Self::PROTO_VERSION,
            checksum_body: EMPTY_BODY_CHECKSUM,
            command,
            ..Zeroable::zeroed()
        }
    }
}

impl<Command> MessageHeaderTrait for ProtobufMessageHeader<Command>
where
    Command: Pod + Send + Sync,
{
    const SIZE: usize = size_of::<Self>();

    fn encode(&self, dst: &mut BytesMut) {
        let bytes: &[u8] = bytemuck::bytes_of(self);
        dst.put(bytes);
    }

    fn decode(src: &[u8]) -> Self {
        bytemuck::pod_read_unaligned::<Self>(&src[..size_of::<Self>()])
    }

    fn get_size(&self) -> usize {
        self.size as usize
    }

    fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    fn get_id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn get_trace_id(&self) -> TraceId {
        TraceId::from(self.trace_id)
    }

    fn set_trace_id(&mut self, trace_id: &TraceId) {
        self.trace_id = trace_id.0;
    }

    /// Calculate and set the checksum field for this header.
    /// The checksum covers all header fields after the checksum field itself.
    fn set_checksum(&mut self) {
        let checksum_offset = std::mem::offset_of!(Self, checksum);
        let bytes: &[u8] = bytemuck::bytes_of(self);
        let bytes_to_hash = &bytes[checksum_offset + size_of::<u64>()..size_of::<Self>()];
        self.checksum = xxh3_64(bytes_to_hash);
    }

    fn verify_checksum(&self) -> bool {
        let checksum_offset = std::mem::offset_of!(Self, checksum);
        let bytes: &[u8] = bytemuck::bytes_of(self);
        let bytes_to_hash = &bytes[checksum_offset + size_of::<u64>()..size_of::<Self>()];
        self.checksum == xxh3_64(bytes_to_hash)
    }

    /// Calculate and set the body checksum field.
    /// The checksum covers the message body after this header.
    fn set_body_checksum(&mut self, body: &[u8]) {
        self.checksum_body = if body.is_empty() {
            EMPTY_BODY_CHECKSUM
        } else {
            xxh3_64(body)
        };
    }

    /// Verify that the body checksum field matches the calculated checksum.
    /// Returns true if valid, false otherwise.
    fn verify_body_checksum(&self, body: &[u8]) -> bool {
        let calculated = if body.is_empty() {
            EMPTY_BODY_CHECKSUM
        } else {
            xxh3_64(body)
        };
        self.checksum_body == calculated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(i32)]
    enum Cmd {
        Invalid = 0,
    }
    unsafe impl Pod for Cmd {}
    unsafe impl Zeroable for Cmd {}

    #[test]
    fn header_roundtrips_as_pod_bytes() {
        let mut header = ProtobufMessageHeader::new(Cmd::Invalid);
        header.id = 42;
        header.size = 48;
        header.trace_id = 0xdead_beef;
        header.set_checksum();

        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), ProtobufMessageHeader::<Cmd>::SIZE);

        let decoded = ProtobufMessageHeader::<Cmd>::decode(&buf);
        assert!(decoded.verify_checksum());
        assert_eq!(decoded.id, 42);
        assert_eq!(decoded.trace_id, 0xdead_beef);
        assert_eq!(decoded.proto_version, ProtobufMessageHeader::<Cmd>::PROTO_VERSION);
    }

    #[test]
    fn empty_body_checksum_matches_constant() {
        let header = ProtobufMessageHeader::new(Cmd::Invalid);
        assert!(header.verify_body_checksum(b""));
    }
}
