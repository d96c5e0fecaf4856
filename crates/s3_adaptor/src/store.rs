use bytes::Bytes;
use std::io;

/// Object-store client capability, injected at adaptor construction. Each
/// block of a chunk is one object; see [`object_name`].
#[allow(async_fn_in_trait)]
pub trait ObjectClient: Send + Sync {
    /// Write a new object, replacing any previous object of that name.
    async fn upload(&self, name: &str, buf: &[u8]) -> io::Result<usize>;

    /// Append at the end of an existing object.
    async fn append(&self, name: &str, buf: &[u8]) -> io::Result<usize>;

    /// Read exactly `len` bytes starting at `offset`. A missing or short
    /// object is an error.
    async fn download(&self, name: &str, offset: u64, len: u64) -> io::Result<Bytes>;
}

/// Name of the object backing one block of a chunk at one inode generation.
/// This is the sole naming convention used against the store and is visible
/// in the store itself, so the format must stay bit-exact.
pub fn object_name(chunk_id: u64, block_index: u64, version: u64) -> String {
    format!("{chunk_id}_{block_index}_{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_joins_decimal_fields() {
        assert_eq!(object_name(25, 3, 1), "25_3_1");
        assert_eq!(object_name(0, 0, 0), "0_0_0");
    }

    #[test]
    fn names_stay_distinct_across_digit_shifts() {
        assert_ne!(object_name(1, 23, 4), object_name(12, 3, 4));
        assert_ne!(object_name(11, 1, 1), object_name(1, 11, 1));
        assert_ne!(object_name(1, 1, 11), object_name(1, 11, 1));
    }
}
