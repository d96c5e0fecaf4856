use bytes::{Bytes, BytesMut};
use data_types::{Inode, S3ChunkInfo, TraceId};
use tracing::debug;

use crate::chunk;
use crate::config::Config;
use crate::error::AdaptorError;
use crate::rpc::{MetaServerClient, MetaServerEndpoint, SpaceAllocClient, SpaceAllocEndpoint};
use crate::store::{ObjectClient, object_name};

/// One narrowed fetch of a read plan: the sub-range to pull from the store
/// and the cursor into the caller's buffer where it lands.
struct S3ReadRequest {
    chunk_info: S3ChunkInfo,
    read_offset: u64,
}

struct S3ReadResponse {
    read_offset: u64,
    data: Bytes,
}

/// Translates logical inode I/O into per-block object operations against an
/// S3-compatible store, and keeps the inode's chunk index current.
///
/// Stateless across inodes; callers must serialize operations on the same
/// inode. All external calls are sequential awaits.
pub struct S3ClientAdaptor<S, M, A> {
    block_size: u64,
    chunk_size: u64,
    store: S,
    meta: M,
    space: A,
}

impl<S: ObjectClient> S3ClientAdaptor<S, MetaServerEndpoint, SpaceAllocEndpoint> {
    /// Adaptor wired to the configured RPC endpoints.
    pub fn from_config(config: &Config, store: S) -> Result<Self, AdaptorError> {
        Self::new(
            config,
            store,
            MetaServerEndpoint::new(config),
            SpaceAllocEndpoint::new(config),
        )
    }
}

impl<S, M, A> S3ClientAdaptor<S, M, A>
where
    S: ObjectClient,
    M: MetaServerClient,
    A: SpaceAllocClient,
{
    pub fn new(config: &Config, store: S, meta: M, space: A) -> Result<Self, AdaptorError> {
        config.validate()?;
        Ok(Self {
            block_size: config.block_size,
            chunk_size: config.chunk_size,
            store,
            meta,
            space,
        })
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Write `buf` at `offset`, slicing chunk-wise and block-wise. Written
    /// ranges are merged into the inode's chunk index and the inode's
    /// version is advanced; its logical length stays caller-owned.
    ///
    /// On failure the index keeps the entries merged before the error and
    /// the error is returned; there is no rollback.
    pub async fn write(
        &self,
        inode: &mut Inode,
        offset: u64,
        buf: &[u8],
    ) -> Result<u64, AdaptorError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let length = buf.len() as u64;
        let trace_id = TraceId::new();
        debug!(%trace_id, fs_id = inode.fs_id, inode_id = inode.inode_id, offset, length,
               inode_length = inode.length, "write start");

        let mut append = false;
        let version = if inode.length == 0 {
            // First-ever write of this inode.
            0
        } else if chunk::is_overlap(&inode.s3_chunks, offset, length) {
            self.meta
                .update_inode_s3_version(inode.fs_id, inode.inode_id, &trace_id)
                .await
                .map_err(AdaptorError::VersionUpdate)?
        } else {
            // Hole or append write: stays at the current generation.
            append = chunk::is_append_block(&inode.s3_chunks, offset, length, self.block_size);
            inode.s3_chunks.last().map(|e| e.version).unwrap_or(0)
        };
        debug!(%trace_id, version, append, "write classified");

        let mut index = offset / self.chunk_size;
        let mut chunk_pos = offset % self.chunk_size;
        let mut write_offset: u64 = 0;
        let mut remaining = length;
        while remaining > 0 {
            let n = remaining.min(self.chunk_size - chunk_pos);
            let chunk_id = self.get_chunk_id(inode, index, &trace_id).await?;
            let slice = &buf[write_offset as usize..(write_offset + n) as usize];
            let written = self
                .write_chunk(chunk_id, version, chunk_pos, slice, append, &trace_id)
                .await?;
            chunk::merge_entry(
                &mut inode.s3_chunks,
                chunk_id,
                version,
                index * self.chunk_size + chunk_pos,
                written,
            );

            // Append is only meaningful for the first slice.
            append = false;
            remaining -= written;
            write_offset += written;
            index += 1;
            chunk_pos = 0;
        }

        inode.version = version;
        debug!(%trace_id, written = write_offset, "write done");
        Ok(write_offset)
    }

    /// Chunk id for a logical chunk index: reuse the id of any indexed range
    /// in the same chunk, otherwise allocate a new one.
    async fn get_chunk_id(
        &self,
        inode: &Inode,
        index: u64,
        trace_id: &TraceId,
    ) -> Result<u64, AdaptorError> {
        if inode.length > 0 {
            for entry in &inode.s3_chunks {
                if entry.offset / self.chunk_size == index {
                    return Ok(entry.chunk_id);
                }
            }
        }
        let chunk_id = self
            .space
            .allocate_s3_chunk(inode.fs_id, trace_id)
            .await
            .map_err(AdaptorError::ChunkAlloc)?;
        debug!(%trace_id, chunk_id, index, "allocated chunk id");
        Ok(chunk_id)
    }

    /// Write one chunk-local range as a sequence of per-block object puts.
    /// `append` applies to the first block only. Returns the bytes written.
    async fn write_chunk(
        &self,
        chunk_id: u64,
        version: u64,
        pos: u64,
        buf: &[u8],
        mut append: bool,
        trace_id: &TraceId,
    ) -> Result<u64, AdaptorError> {
        let mut block_index = pos / self.block_size;
        let mut block_pos = pos % self.block_size;
        let mut write_offset: u64 = 0;
        let mut remaining = buf.len() as u64;
        debug!(%trace_id, chunk_id, version, pos, len = remaining, append, "write chunk");
        while remaining > 0 {
            let n = remaining.min(self.block_size - block_pos);
            let name = object_name(chunk_id, block_index, version);
            let slice = &buf[write_offset as usize..(write_offset + n) as usize];
            if append {
                self.store
                    .append(&name, slice)
                    .await
                    .map_err(|source| AdaptorError::StoreWrite {
                        name: name.clone(),
                        source,
                    })?;
                append = false;
            } else {
                self.store
                    .upload(&name, slice)
                    .await
                    .map_err(|source| AdaptorError::StoreWrite {
                        name: name.clone(),
                        source,
                    })?;
            }
            remaining -= n;
            block_index += 1;
            write_offset += n;
            block_pos = 0;
        }
        Ok(write_offset)
    }

    /// Read into `buf` from `offset`. Regions never written come back
    /// zeroed. Returns the number of bytes produced, which on success is
    /// the full buffer.
    pub async fn read(
        &self,
        inode: &Inode,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<u64, AdaptorError> {
        let trace_id = TraceId::new();
        let mut chunks = chunk::effective_chunks(inode);
        chunks.sort_by_key(|c| c.offset);
        debug!(%trace_id, fs_id = inode.fs_id, inode_id = inode.inode_id, offset,
               length = buf.len() as u64, ranges = chunks.len(), "read start");

        let requests = build_read_plan(&chunks, offset, buf);
        let responses = self.handle_read_requests(&requests, &trace_id).await?;
        for resp in &responses {
            let at = resp.read_offset as usize;
            buf[at..at + resp.data.len()].copy_from_slice(&resp.data);
        }
        debug!(%trace_id, read = buf.len(), "read done");
        Ok(buf.len() as u64)
    }

    /// Fetch every planned sub-range, block by block, into its own buffer.
    /// Any block failure aborts the read.
    async fn handle_read_requests(
        &self,
        requests: &[S3ReadRequest],
        trace_id: &TraceId,
    ) -> Result<Vec<S3ReadResponse>, AdaptorError> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            let chunk_info = &request.chunk_info;
            let mut block_index = (chunk_info.offset % self.chunk_size) / self.block_size;
            let mut block_pos = (chunk_info.offset % self.chunk_size) % self.block_size;
            let mut remaining = chunk_info.len;
            let mut data = BytesMut::with_capacity(chunk_info.len as usize);
            while remaining > 0 {
                let n = remaining.min(self.block_size - block_pos);
                let name = object_name(chunk_info.chunk_id, block_index, chunk_info.version);
                let bytes = self
                    .store
                    .download(&name, block_pos, n)
                    .await
                    .map_err(|source| AdaptorError::StoreRead {
                        name: name.clone(),
                        source,
                    })?;
                data.extend_from_slice(&bytes);
                remaining -= n;
                block_index += 1;
                block_pos = 0;
            }
            debug!(%trace_id, read_offset = request.read_offset, len = data.len(), "read request served");
            responses.push(S3ReadResponse {
                read_offset: request.read_offset,
                data: data.freeze(),
            });
        }
        Ok(responses)
    }
}

/// Walk the sorted, non-overlapping ranges against the request window
/// `[offset, offset + buf.len())`, narrowing each covered region into a
/// request and zeroing the gaps in place.
fn build_read_plan(chunks: &[S3ChunkInfo], offset: u64, buf: &mut [u8]) -> Vec<S3ReadRequest> {
    let mut requests = Vec::new();
    let mut offset = offset;
    let mut length = buf.len() as u64;
    let mut read_offset: u64 = 0;
    let mut i = 0;

    while length > 0 {
        if i == chunks.len() {
            // Past the last range: the tail is a hole.
            zero(buf, read_offset, length);
            break;
        }
        let chunk_info = &chunks[i];
        if offset + length <= chunk_info.offset {
            // Window ends before this range begins.
            zero(buf, read_offset, length);
            break;
        } else if chunk_info.offset >= offset {
            // Gap (possibly empty) up to the range start, then the range.
            let gap = chunk_info.offset - offset;
            zero(buf, read_offset, gap);
            offset += gap;
            read_offset += gap;
            length -= gap;

            if offset + length <= chunk_info.end() {
                requests.push(S3ReadRequest {
                    chunk_info: narrowed(chunk_info, offset, length),
                    read_offset,
                });
                read_offset += length;
                length = 0;
            } else {
                let n = chunk_info.len;
                requests.push(S3ReadRequest {
                    chunk_info: chunk_info.clone(),
                    read_offset,
                });
                read_offset += n;
                length -= n;
                offset += n;
            }
        } else if chunk_info.end() > offset {
            // Range begins before the window and reaches into it.
            if offset + length <= chunk_info.end() {
                requests.push(S3ReadRequest {
                    chunk_info: narrowed(chunk_info, offset, length),
                    read_offset,
                });
                read_offset += length;
                length = 0;
            } else {
                let n = chunk_info.end() - offset;
                requests.push(S3ReadRequest {
                    chunk_info: narrowed(chunk_info, offset, n),
                    read_offset,
                });
                read_offset += n;
                length -= n;
                offset += n;
            }
        }
        // Ranges entirely before the window fall through and are skipped.
        i += 1;
    }
    requests
}

fn narrowed(chunk_info: &S3ChunkInfo, offset: u64, len: u64) -> S3ChunkInfo {
    S3ChunkInfo::new(chunk_info.chunk_id, chunk_info.version, offset, len)
}

fn zero(buf: &mut [u8], at: u64, len: u64) {
    buf[at as usize..(at + len) as usize].fill(0);
}
