//! # Frame Codec
//!
//! Every message on a peer or rendezvous connection is a 4-byte big-endian
//! length followed by that many bytes of canonical encoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::wire::{self, MAX_MESSAGE_SIZE};
use shared_types::WireError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::errors::ProtocolError;

/// Read one frame. `Ok(None)` means the peer closed cleanly between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]).await? {
            0 if filled == 0 => return Ok(None),
            0 => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed inside a frame header",
                )
                .into())
            }
            n => filled += n,
        }
    }
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(WireError::FrameTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        }
        .into());
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(Some(buf))
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(WireError::FrameTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        }
        .into());
    }
    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode one message. `Ok(None)` on clean close.
pub async fn read_message<T, R>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin + ?Sized,
{
    match read_frame(reader).await? {
        Some(bytes) => Ok(Some(wire::decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and write one message.
pub async fn write_message<T, W>(writer: &mut W, message: &T) -> Result<(), ProtocolError>
where
    T: Serialize + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    write_frame(writer, &wire::encode(message)?).await
}
