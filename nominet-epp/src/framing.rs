//! RFC 5734 data units: a 4-byte big-endian total length (header included) followed by
//! the XML payload.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{EppError, Result};

const HEADER_LEN: u32 = 4;

/// Default upper bound for an inbound frame.
pub const DEFAULT_MAX_FRAME: u32 = 1024 * 1024;

/// Writes one frame and flushes.
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let total = u32::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_add(HEADER_LEN))
        .ok_or_else(|| EppError::SerializationError {
            detail: format!("payload of {} bytes cannot be framed", payload.len()),
        })?;

    writer.write_all(&total.to_be_bytes()).await?;
    writer.write_all(payload.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame and returns its payload as UTF-8.
pub async fn read_frame<R>(reader: &mut R, max_frame: u32) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    reader.read_exact(&mut header).await?;
    let total = u32::from_be_bytes(header);

    if total < HEADER_LEN || total > max_frame {
        return Err(EppError::FrameTooLarge {
            length: total,
            limit: max_frame,
        });
    }

    let mut payload = vec![0u8; (total - HEADER_LEN) as usize];
    reader.read_exact(&mut payload).await?;
    String::from_utf8(payload).map_err(|e| EppError::ParseError {
        detail: format!("frame is not valid UTF-8: {e}"),
    })
}
