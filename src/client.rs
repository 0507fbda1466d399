use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{
    CommandKind, ZoneCountResponse, ZoneInfoResponse, ZoneNameResponse, PORT,
};
use crate::relay_connection::RelayConnection;
use crate::types::ZoneType;
use crate::zone::Zone;

/// Timeout for the initial TCP connect.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one Skydance Wi-Fi relay.
///
/// The `RelayClient` owns the persistent connection to the relay and the
/// zone inventory built by [`discover_zones`](RelayClient::discover_zones).
/// All commands on one relay share the connection, so they are serialized
/// and paced automatically.
pub struct RelayClient {
    relay: Arc<RelayConnection>,
    zones: Mutex<Vec<Zone>>,
}

impl RelayClient {
    /// Connect to a relay at the given host, on the protocol's default port.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use skydance_relay::RelayClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = RelayClient::connect("192.168.1.100").await?;
    ///     let zones = client.discover_zones().await?;
    ///     for zone in &zones {
    ///         println!("{}: {} ({})", zone.number(), zone.name(), zone.zone_type());
    ///     }
    ///     client.close().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(host: impl Into<String>) -> Result<Self> {
        Self::connect_to(host, PORT, None).await
    }

    /// Connect with an explicit port and the relay's MAC address.
    ///
    /// The MAC is not used on the wire; it provides stable identifiers for
    /// zones across address changes (see [`Zone::unique_id`]).
    pub async fn connect_to(
        host: impl Into<String>,
        port: u16,
        mac: Option<String>,
    ) -> Result<Self> {
        let relay = RelayConnection::connect(host.into(), port, mac, CONNECT_TIMEOUT).await?;
        Ok(Self {
            relay: Arc::new(relay),
            zones: Mutex::new(Vec::new()),
        })
    }

    /// Host address of the relay.
    pub fn host(&self) -> &str {
        self.relay.host()
    }

    /// Port of the relay connection.
    pub fn port(&self) -> u16 {
        self.relay.port()
    }

    /// MAC address of the relay, when provided at connect time.
    pub fn mac(&self) -> Option<&str> {
        self.relay.mac()
    }

    /// Check that the relay answers on the connection.
    pub async fn ping(&self) -> Result<()> {
        self.relay.ping().await
    }

    /// Enumerate the relay's zones.
    ///
    /// Runs the discovery sequence: a ping to validate the connection, the
    /// zone-count query, then one zone-info query per zone in ascending
    /// order. The relay answers strictly one command at a time, so the
    /// sequence is inherently serial.
    ///
    /// Discovery is all-or-nothing: if any reply fails to decode (the relay
    /// is known to occasionally answer zone queries out of order), the whole
    /// attempt fails with a single error, no partial inventory is kept, and
    /// a previously discovered zone list remains available through
    /// [`zones`](RelayClient::zones). On success the new list replaces the
    /// old one entirely.
    pub async fn discover_zones(&self) -> Result<Vec<Zone>> {
        self.relay.ping().await?;

        tracing::info!("Getting number of zones");
        let reply = self.relay.execute(CommandKind::GetZoneCount).await?;
        let count = ZoneCountResponse::decode(&reply)?.count;
        tracing::info!("Relay at {} reports {} zone(s)", self.relay.host(), count);

        let mut zones = Vec::with_capacity(count as usize);
        for number in 1..=count {
            tracing::info!("Getting info about zone={}", number);
            let reply = self
                .relay
                .execute(CommandKind::GetZoneInfo { zone: number })
                .await?;
            let info = ZoneInfoResponse::decode(&reply)?;
            tracing::debug!(
                "Zone={} has type={}, name={:?}",
                number,
                info.kind,
                info.name
            );
            if info.kind == ZoneType::Rgbcct {
                tracing::warn!(
                    "Zone={} ({}) is RGBCCT; dual-white control is not supported, driving it as RGBW",
                    number,
                    info.name
                );
            }
            zones.push(Zone::new(self.relay.clone(), number, info.kind, info.name));
        }

        *self.zones.lock().unwrap() = zones.clone();
        Ok(zones)
    }

    /// The zone inventory from the last successful discovery.
    pub fn zones(&self) -> Vec<Zone> {
        self.zones.lock().unwrap().clone()
    }

    /// Query the configured name of a single zone.
    pub async fn zone_name(&self, zone: u8) -> Result<String> {
        let reply = self
            .relay
            .execute(CommandKind::GetZoneName { zone })
            .await?;
        Ok(ZoneNameResponse::decode(&reply)?.name)
    }

    /// Close the connection to the relay.
    ///
    /// Waits for any in-flight command to finish first; closing an
    /// already-closed client is a no-op.
    pub async fn close(&self) -> Result<()> {
        self.relay.close().await
    }
}
