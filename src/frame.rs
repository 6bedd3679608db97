//! Record framing for the file backends
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! Both integers are little-endian. The CRC32 covers the payload only.
//! A frame is one commit, so a torn tail loses a whole commit and never
//! part of one.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FeedStoreError, Result};

/// Header size: 4 bytes length + 4 bytes CRC
pub const HEADER_SIZE: usize = 8;

/// Largest payload a frame may carry (64 MB)
pub const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Frame a payload
///
/// Fails if the payload is larger than [`MAX_FRAME_SIZE`]; such a frame
/// would be rejected by [`scan_frames`] on the next open.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_FRAME_SIZE as usize {
        return Err(FeedStoreError::Storage(format!(
            "frame payload of {} bytes exceeds the {} byte limit",
            payload.len(),
            MAX_FRAME_SIZE
        )));
    }

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u32_le(payload.len() as u32);
    buf.put_u32_le(crc32fast::hash(payload));
    buf.put_slice(payload);
    Ok(buf.to_vec())
}

/// Result of scanning a framed file
#[derive(Debug, Default)]
pub struct FrameScan {
    /// Payloads of every valid frame, in order
    pub frames: Vec<Vec<u8>>,

    /// Byte length of the valid prefix
    pub valid_len: usize,

    /// Whether bytes after the valid prefix had to be discarded
    pub was_truncated: bool,
}

/// Scan frames front to back, stopping at the first short or corrupt one
pub fn scan_frames(data: &[u8]) -> FrameScan {
    let mut scan = FrameScan::default();
    let mut rest = data;

    while rest.remaining() >= HEADER_SIZE {
        let mut header = &rest[..HEADER_SIZE];
        let len = header.get_u32_le();
        let crc = header.get_u32_le();

        if len > MAX_FRAME_SIZE || rest.len() - HEADER_SIZE < len as usize {
            break;
        }

        let payload = &rest[HEADER_SIZE..HEADER_SIZE + len as usize];
        if crc32fast::hash(payload) != crc {
            break;
        }

        scan.frames.push(payload.to_vec());
        scan.valid_len += HEADER_SIZE + len as usize;
        rest.advance(HEADER_SIZE + len as usize);
    }

    scan.was_truncated = scan.valid_len < data.len();
    scan
}
