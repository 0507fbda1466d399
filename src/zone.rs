use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::convert;
use crate::error::Result;
use crate::protocol::CommandKind;
use crate::relay_connection::RelayConnection;
use crate::types::{Capabilities, ZoneType};

/// Pause between the sub-operations of a composite update.
///
/// These commands are grouped by the caller rather than serialized by the
/// writer alone, and the relay needs extra settling time between them on top
/// of the per-write pacing.
const PAUSE_BETWEEN_OPERATIONS: Duration = Duration::from_millis(250);

/// Handle for controlling a single zone.
///
/// A `Zone` is created by [`RelayClient::discover_zones`] and provides the
/// mutating commands for one lighting circuit. Every command is an
/// independent round-trip on the shared relay connection; the zone's
/// in-memory attribute state is updated only after the round-trip succeeds.
///
/// [`RelayClient::discover_zones`]: crate::RelayClient::discover_zones
#[derive(Debug, Clone)]
pub struct Zone {
    relay: Arc<RelayConnection>,
    number: u8,
    kind: ZoneType,
    name: String,
    state: Arc<Mutex<ZoneState>>,
}

/// Last-known attribute values for a zone.
///
/// The relay cannot be queried for attribute state, so these values are
/// assumed: they start unknown, can be seeded from previously persisted
/// values via [`Zone::restore`], and track successful commands afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    /// Whether the zone is powered on.
    pub power: Option<bool>,
    /// Brightness, 0-255.
    pub brightness: Option<u8>,
    /// Color temperature in mireds.
    pub color_temp: Option<u16>,
    /// Last RGB color.
    pub rgb: Option<(u8, u8, u8)>,
    /// Last RGBW color.
    pub rgbw: Option<(u8, u8, u8, u8)>,
}

/// Attribute changes to apply together with a power-on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOn {
    brightness: Option<u8>,
    color_temp: Option<u16>,
    rgb: Option<(u8, u8, u8)>,
    rgbw: Option<(u8, u8, u8, u8)>,
}

impl TurnOn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Color temperature in mireds; clamped to the supported range.
    pub fn color_temp(mut self, mireds: u16) -> Self {
        self.color_temp = Some(mireds);
        self
    }

    pub fn rgb(mut self, red: u8, green: u8, blue: u8) -> Self {
        self.rgb = Some((red, green, blue));
        self
    }

    pub fn rgbw(mut self, red: u8, green: u8, blue: u8, white: u8) -> Self {
        self.rgbw = Some((red, green, blue, white));
        self
    }
}

impl Zone {
    pub(crate) fn new(
        relay: Arc<RelayConnection>,
        number: u8,
        kind: ZoneType,
        name: String,
    ) -> Self {
        Self {
            relay,
            number,
            kind,
            name,
            state: Arc::new(Mutex::new(ZoneState::default())),
        }
    }

    /// Zone number assigned by the relay, 1-based.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Hardware type reported during discovery.
    pub fn zone_type(&self) -> ZoneType {
        self.kind
    }

    /// Human-readable name configured on the relay.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The controls this zone supports.
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Stable identifier: `skydance-{mac}-{zone}` (host stands in for the
    /// MAC when it is not known).
    pub fn unique_id(&self) -> String {
        format!("skydance-{}-{}", self.relay.device_id(), self.number)
    }

    /// Snapshot of the last-known attribute values.
    pub fn state(&self) -> ZoneState {
        *self.state.lock().unwrap()
    }

    /// Seed the attribute state from previously persisted values.
    pub fn restore(&self, state: ZoneState) {
        *self.state.lock().unwrap() = state;
    }

    /// Power the zone on.
    pub async fn power_on(&self) -> Result<()> {
        tracing::debug!("Powering on zone {}", self.unique_id());
        self.relay
            .execute(CommandKind::PowerOn { zone: self.number })
            .await?;
        self.state.lock().unwrap().power = Some(true);
        Ok(())
    }

    /// Power the zone off.
    pub async fn power_off(&self) -> Result<()> {
        tracing::debug!("Powering off zone {}", self.unique_id());
        self.relay
            .execute(CommandKind::PowerOff { zone: self.number })
            .await?;
        self.state.lock().unwrap().power = Some(false);
        Ok(())
    }

    /// Set brightness, 0-255.
    pub async fn set_brightness(&self, brightness: u8) -> Result<()> {
        tracing::debug!("Setting brightness={} for zone {}", brightness, self.unique_id());
        self.relay
            .execute(CommandKind::SetBrightness {
                zone: self.number,
                brightness,
            })
            .await?;
        self.state.lock().unwrap().brightness = Some(brightness);
        Ok(())
    }

    /// Set color temperature in mireds; clamped to the supported range.
    pub async fn set_color_temp(&self, mireds: u16) -> Result<()> {
        tracing::debug!("Setting color_temp={} for zone {}", mireds, self.unique_id());
        let temperature = convert::mireds_to_byte(mireds);
        self.relay
            .execute(CommandKind::SetTemperature {
                zone: self.number,
                temperature,
            })
            .await?;
        self.state.lock().unwrap().color_temp = Some(mireds);
        Ok(())
    }

    /// Set an RGB color.
    ///
    /// The relay has no RGB-only command; this sends the RGBW command with
    /// the white channel forced to zero.
    pub async fn set_rgb(&self, red: u8, green: u8, blue: u8) -> Result<()> {
        tracing::debug!(
            "Setting red={} green={} blue={} for zone {}",
            red,
            green,
            blue,
            self.unique_id()
        );
        self.relay
            .execute(CommandKind::SetRgbw {
                zone: self.number,
                red,
                green,
                blue,
                white: 0,
            })
            .await?;
        self.state.lock().unwrap().rgb = Some((red, green, blue));
        Ok(())
    }

    /// Set an RGBW color.
    pub async fn set_rgbw(&self, red: u8, green: u8, blue: u8, white: u8) -> Result<()> {
        tracing::debug!(
            "Setting red={} green={} blue={} white={} for zone {}",
            red,
            green,
            blue,
            white,
            self.unique_id()
        );
        self.relay
            .execute(CommandKind::SetRgbw {
                zone: self.number,
                red,
                green,
                blue,
                white,
            })
            .await?;
        self.state.lock().unwrap().rgbw = Some((red, green, blue, white));
        Ok(())
    }

    /// Power the zone on and apply the requested attributes, as an ordered
    /// sequence of independent command round-trips with a settling pause
    /// between them.
    pub async fn turn_on(&self, options: TurnOn) -> Result<()> {
        self.power_on().await?;
        if let Some((red, green, blue, white)) = options.rgbw {
            sleep(PAUSE_BETWEEN_OPERATIONS).await;
            self.set_rgbw(red, green, blue, white).await?;
        }
        if let Some((red, green, blue)) = options.rgb {
            sleep(PAUSE_BETWEEN_OPERATIONS).await;
            self.set_rgb(red, green, blue).await?;
        }
        if let Some(mireds) = options.color_temp {
            sleep(PAUSE_BETWEEN_OPERATIONS).await;
            self.set_color_temp(mireds).await?;
        }
        if let Some(brightness) = options.brightness {
            sleep(PAUSE_BETWEEN_OPERATIONS).await;
            self.set_brightness(brightness).await?;
        }
        Ok(())
    }

    /// Power the zone off.
    pub async fn turn_off(&self) -> Result<()> {
        self.power_off().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_on_builder_collects_attributes() {
        let options = TurnOn::new().brightness(200).rgb(1, 2, 3);
        assert_eq!(options.brightness, Some(200));
        assert_eq!(options.rgb, Some((1, 2, 3)));
        assert_eq!(options.rgbw, None);
        assert_eq!(options.color_temp, None);
    }

    #[test]
    fn zone_state_starts_unknown() {
        let state = ZoneState::default();
        assert_eq!(state.power, None);
        assert_eq!(state.brightness, None);
    }
}
