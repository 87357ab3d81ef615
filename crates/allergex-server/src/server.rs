//! Accept loop and per-connection sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use allergex_nlp::Engine;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::protocol::{read_frame, write_frame, Response};
use crate::Result;

/// Pause after an accept error not tied to a single connection (e.g. `EMFILE`).
const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Serve connections forever. Each connection runs on its own task against
/// the shared engine; accept failures are logged and never stop the loop.
pub async fn serve(listener: TcpListener, engine: Arc<Engine>, max_frame_bytes: usize) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) if is_connection_error(&e) => {
                debug!("Connection dropped before accept: {e}");
                continue;
            }
            Err(e) => {
                warn!("Accept error: {e}; retrying in {ACCEPT_BACKOFF:?}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        let engine = Arc::clone(&engine);
        let session = Uuid::new_v4();
        let span = tracing::info_span!("session", %session, %peer);

        tokio::spawn(
            async move {
                debug!("Client connected");
                let (mut reader, mut writer) = stream.into_split();
                if let Err(e) =
                    handle_connection(&mut reader, &mut writer, &engine, max_frame_bytes, peer).await
                {
                    error!("Communication error with {peer}: {e}");
                }
                debug!("Connection closed");
            }
            .instrument(span),
        );
    }
}

/// Answer request frames until the peer closes the stream.
///
/// Engine failures are reported to the peer as an error response and do not
/// end the session; framing and I/O failures do.
pub async fn handle_connection<R, W>(
    reader: &mut R,
    writer: &mut W,
    engine: &Engine,
    max_frame_bytes: usize,
    peer: SocketAddr,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut requests = 0usize;

    while let Some(text) = read_frame(reader, max_frame_bytes).await? {
        requests += 1;
        debug!(text_len = text.len(), "Request received");

        let response = match engine.fit(&text).await {
            Ok(records) => {
                for record in &records {
                    debug!("{record}");
                }
                Response::Ok { records }
            }
            Err(e) => {
                if e.is_processing() {
                    warn!("Model processing error for {peer}: {e}");
                } else {
                    error!("Engine error for {peer}: {e}");
                }
                Response::Error { message: e.to_string() }
            }
        };

        write_frame(writer, &serde_json::to_string(&response)?).await?;
        debug!("Response sent");
    }

    info!(requests, "Client {peer} disconnected");
    Ok(())
}

/// Errors that concern only the connection being accepted.
fn is_connection_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_accept_error_classification() {
        assert!(is_connection_error(&Error::from(ErrorKind::ConnectionAborted)));
        assert!(is_connection_error(&Error::from(ErrorKind::ConnectionReset)));
        // EMFILE surfaces as an uncategorised OS error
        assert!(!is_connection_error(&Error::from_raw_os_error(24)));
        assert!(!is_connection_error(&Error::from(ErrorKind::OutOfMemory)));
    }
}
