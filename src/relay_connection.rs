use std::time::Duration;

use crate::error::Result;
use crate::protocol::{CommandKind, ResponseFrame};
use crate::session::Session;
use crate::writer::SequentialWriter;

/// Connection to a specific relay.
///
/// Bundles the TCP session, the frame-sequencing state, and the write
/// discipline shared by every command sent to the device. One
/// `RelayConnection` exists per established connection; it is torn down
/// explicitly with [`RelayConnection::close`].
#[derive(Debug)]
pub(crate) struct RelayConnection {
    host: String,
    port: u16,
    mac: Option<String>,
    writer: SequentialWriter,
}

impl RelayConnection {
    /// Connect to a relay at the given host and port.
    pub async fn connect(
        host: String,
        port: u16,
        mac: Option<String>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let session = Session::open(&host, port, connect_timeout).await?;
        Ok(Self {
            host,
            port,
            mac,
            writer: SequentialWriter::new(session),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// MAC address of the relay, when known. Used for stable identifiers.
    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    /// Identity string for this relay: the MAC when known, the host address
    /// otherwise.
    pub fn device_id(&self) -> &str {
        self.mac.as_deref().unwrap_or(&self.host)
    }

    /// Run one command round-trip and return the paired reply frame.
    pub async fn execute(&self, kind: CommandKind) -> Result<ResponseFrame> {
        self.writer.execute(kind).await
    }

    /// Validate that the relay is alive. The reply carries no data and is
    /// discarded.
    pub async fn ping(&self) -> Result<()> {
        self.writer.execute(CommandKind::Ping).await?;
        Ok(())
    }

    /// Close the connection after any in-flight command finishes.
    pub async fn close(&self) -> Result<()> {
        self.writer.close().await
    }
}
