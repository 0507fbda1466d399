use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware type of a zone, as reported by the relay during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    Switch,
    Dimmer,
    Cct,
    Rgb,
    Rgbw,
    Rgbcct,
}

impl ZoneType {
    /// Map the type byte from a zone-info reply, `None` for unknown values.
    pub(crate) fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ZoneType::Switch),
            0x02 => Some(ZoneType::Dimmer),
            0x03 => Some(ZoneType::Cct),
            0x04 => Some(ZoneType::Rgb),
            0x05 => Some(ZoneType::Rgbw),
            0x06 => Some(ZoneType::Rgbcct),
            _ => None,
        }
    }

    /// The controls this zone type supports.
    ///
    /// RGBCCT zones are driven as RGBW: the dual-white channel pair is not
    /// controllable through this client, so their capability set equals
    /// [`ZoneType::Rgbw`]'s.
    pub fn capabilities(self) -> Capabilities {
        match self {
            ZoneType::Switch => Capabilities {
                power: true,
                ..Capabilities::default()
            },
            ZoneType::Dimmer => Capabilities {
                power: true,
                brightness: true,
                ..Capabilities::default()
            },
            ZoneType::Cct => Capabilities {
                power: true,
                brightness: true,
                color_temp: true,
                ..Capabilities::default()
            },
            ZoneType::Rgb => Capabilities {
                power: true,
                brightness: true,
                rgb: true,
                ..Capabilities::default()
            },
            ZoneType::Rgbw | ZoneType::Rgbcct => Capabilities {
                power: true,
                brightness: true,
                rgb: true,
                rgbw: true,
                ..Capabilities::default()
            },
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneType::Switch => "switch",
            ZoneType::Dimmer => "dimmer",
            ZoneType::Cct => "CCT",
            ZoneType::Rgb => "RGB",
            ZoneType::Rgbw => "RGBW",
            ZoneType::Rgbcct => "RGBCCT",
        };
        f.write_str(name)
    }
}

/// The subset of controls a zone supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub power: bool,
    pub brightness: bool,
    pub color_temp: bool,
    pub rgb: bool,
    pub rgbw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_is_power_only() {
        let caps = ZoneType::Switch.capabilities();
        assert!(caps.power);
        assert!(!caps.brightness);
        assert!(!caps.color_temp);
        assert!(!caps.rgb);
        assert!(!caps.rgbw);
    }

    #[test]
    fn rgbcct_degrades_to_rgbw() {
        assert_eq!(
            ZoneType::Rgbcct.capabilities(),
            ZoneType::Rgbw.capabilities()
        );
    }

    #[test]
    fn wire_bytes_map_to_all_types() {
        for (byte, kind) in [
            (0x01, ZoneType::Switch),
            (0x02, ZoneType::Dimmer),
            (0x03, ZoneType::Cct),
            (0x04, ZoneType::Rgb),
            (0x05, ZoneType::Rgbw),
            (0x06, ZoneType::Rgbcct),
        ] {
            assert_eq!(ZoneType::from_wire(byte), Some(kind));
        }
        assert_eq!(ZoneType::from_wire(0x00), None);
        assert_eq!(ZoneType::from_wire(0x42), None);
    }
}
