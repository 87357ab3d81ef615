//! Length-prefixed framing and the response envelope.

use allergex_nlp::ResultRecord;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Result, ServerError};

/// Reply to one request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { records: Vec<ResultRecord> },
    Error { message: String },
}

/// Read one frame. Returns `Ok(None)` on a clean EOF before the length prefix.
pub async fn read_frame<R>(reader: &mut R, max_bytes: usize) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let size = match reader.read_u32().await {
        Ok(n) => n as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > max_bytes {
        return Err(ServerError::FrameTooLarge { size, limit: max_bytes });
    }

    let mut buf = vec![0u8; size];
    reader.read_exact(&mut buf).await?;
    Ok(Some(String::from_utf8(buf)?))
}

pub async fn write_frame<W>(writer: &mut W, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let size = u32::try_from(payload.len()).map_err(|_| ServerError::FrameTooLarge {
        size: payload.len(),
        limit: u32::MAX as usize,
    })?;
    writer.write_u32(size).await?;
    writer.write_all(payload.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
