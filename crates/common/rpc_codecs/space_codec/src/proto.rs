//! Hand-derived protobuf bodies for the space allocator. Field numbers are
//! part of the wire contract; do not renumber.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SpaceStatusCode {
    Ok = 0,
    NoSpace = 1,
    Unknown = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AllocateS3ChunkRequest {
    #[prost(uint32, tag = "1")]
    pub fs_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AllocateS3ChunkResponse {
    #[prost(enumeration = "SpaceStatusCode", tag = "1")]
    pub status: i32,
    #[prost(uint64, tag = "2")]
    pub chunk_id: u64,
}
