use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{RelayError, Result};
use crate::protocol::RESPONSE_LEN;

/// One TCP connection to a relay.
///
/// The protocol has no delimiter framing: every command is answered with a
/// fixed 64-byte frame, so reads always consume exactly [`RESPONSE_LEN`]
/// bytes to keep the stream aligned.
#[derive(Debug)]
pub(crate) struct Session {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl Session {
    /// Establish the TCP connection, bounded by `connect_timeout`.
    pub async fn open(host: &str, port: u16, connect_timeout: Duration) -> Result<Self> {
        tracing::info!("Connecting to {}:{}", host, port);
        let stream = timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| RelayError::ConnectTimeout(connect_timeout))??;
        Ok(Self {
            host: host.to_string(),
            port,
            stream: Some(stream),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Send the exact byte sequence.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(RelayError::ConnectionClosed)?;
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Read exactly one fixed-size reply frame.
    pub async fn read_response(&mut self) -> Result<[u8; RESPONSE_LEN]> {
        let stream = self.stream.as_mut().ok_or(RelayError::ConnectionClosed)?;
        let mut buf = [0u8; RESPONSE_LEN];
        stream.read_exact(&mut buf).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                RelayError::ConnectionClosed
            } else {
                RelayError::Io(e)
            }
        })?;
        Ok(buf)
    }

    /// Shut the connection down. Calling this again is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            tracing::info!("Closing connection to {}:{}", self.host, self.port);
            stream.shutdown().await?;
        }
        Ok(())
    }
}
