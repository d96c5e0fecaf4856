//! Hand-derived protobuf bodies for the metadata service. Field numbers are
//! part of the wire contract; do not renumber.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MetaStatusCode {
    Ok = 0,
    NotFound = 1,
    Unknown = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateInodeS3VersionRequest {
    #[prost(uint64, tag = "1")]
    pub inode_id: u64,
    #[prost(uint32, tag = "2")]
    pub fs_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateInodeS3VersionResponse {
    #[prost(enumeration = "MetaStatusCode", tag = "1")]
    pub status_code: i32,
    #[prost(uint64, tag = "2")]
    pub version: u64,
}
