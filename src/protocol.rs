//! Binary frame encoding and decoding for the Skydance relay protocol.
//!
//! Requests are small variable-length frames:
//!
//! ```text
//! [head 4B] [opcode 1B] [frame number 1B] [zone 1B] [payload 0-4B] [tail 1B]
//! ```
//!
//! Every request is answered with a fixed 64-byte reply. Replies carry no
//! opcode echo; pairing is positional, so each [`ResponseFrame`] keeps the
//! [`CommandKind`] it answers as decode context.
//!
//! Byte constants below were transcribed from a packet capture of one relay
//! firmware; other firmware revisions are unverified.

use crate::error::{RelayError, Result};
use crate::types::ZoneType;

/// TCP port the relay listens on.
pub const PORT: u16 = 8899;

/// Fixed size of every reply frame.
pub const RESPONSE_LEN: usize = 64;

/// Width of the zone name field in info/name replies.
pub const ZONE_NAME_LEN: usize = 16;

const HEAD: [u8; 4] = [0x55, 0xAA, 0x5A, 0xA5];
const TAIL: u8 = 0x7E;

/// Zone selector value for commands that do not address a zone.
const ZONE_NONE: u8 = 0x00;

mod opcode {
    pub const PING: u8 = 0x10;
    pub const GET_ZONE_COUNT: u8 = 0x16;
    pub const GET_ZONE_INFO: u8 = 0x17;
    pub const GET_ZONE_NAME: u8 = 0x18;
    pub const POWER_ON: u8 = 0x21;
    pub const POWER_OFF: u8 = 0x22;
    pub const SET_BRIGHTNESS: u8 = 0x31;
    pub const SET_TEMPERATURE: u8 = 0x32;
    pub const SET_RGBW: u8 = 0x33;
}

/// Per-connection frame sequencing state.
///
/// Holds the 1-byte counter stamped into every outgoing frame. The counter
/// wraps at 256 and must be advanced exactly once after each successful
/// write, before the next command is encoded. One `State` exists per
/// connection and is never shared between connections.
#[derive(Debug, Default)]
pub struct State {
    frame_number: u8,
}

impl State {
    /// Create a fresh state with the counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame number the next command will carry.
    pub fn frame_number(&self) -> u8 {
        self.frame_number
    }

    /// Advance the counter by one, wrapping modulo 256.
    pub fn advance(&mut self) {
        self.frame_number = self.frame_number.wrapping_add(1);
    }
}

/// The operation a frame performs, together with its arguments.
///
/// Doubles as the pending-command descriptor: the decoder for a reply
/// receives the `CommandKind` the request was built from and validates the
/// reply against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    GetZoneCount,
    GetZoneInfo { zone: u8 },
    GetZoneName { zone: u8 },
    PowerOn { zone: u8 },
    PowerOff { zone: u8 },
    SetBrightness { zone: u8, brightness: u8 },
    SetTemperature { zone: u8, temperature: u8 },
    SetRgbw { zone: u8, red: u8, green: u8, blue: u8, white: u8 },
}

impl CommandKind {
    /// The zone this command addresses, if any.
    pub fn zone(self) -> Option<u8> {
        match self {
            CommandKind::Ping | CommandKind::GetZoneCount => None,
            CommandKind::GetZoneInfo { zone }
            | CommandKind::GetZoneName { zone }
            | CommandKind::PowerOn { zone }
            | CommandKind::PowerOff { zone }
            | CommandKind::SetBrightness { zone, .. }
            | CommandKind::SetTemperature { zone, .. }
            | CommandKind::SetRgbw { zone, .. } => Some(zone),
        }
    }

    fn opcode(self) -> u8 {
        match self {
            CommandKind::Ping => opcode::PING,
            CommandKind::GetZoneCount => opcode::GET_ZONE_COUNT,
            CommandKind::GetZoneInfo { .. } => opcode::GET_ZONE_INFO,
            CommandKind::GetZoneName { .. } => opcode::GET_ZONE_NAME,
            CommandKind::PowerOn { .. } => opcode::POWER_ON,
            CommandKind::PowerOff { .. } => opcode::POWER_OFF,
            CommandKind::SetBrightness { .. } => opcode::SET_BRIGHTNESS,
            CommandKind::SetTemperature { .. } => opcode::SET_TEMPERATURE,
            CommandKind::SetRgbw { .. } => opcode::SET_RGBW,
        }
    }

    fn write_payload(self, raw: &mut Vec<u8>) {
        match self {
            CommandKind::Ping
            | CommandKind::GetZoneCount
            | CommandKind::GetZoneInfo { .. }
            | CommandKind::GetZoneName { .. }
            | CommandKind::PowerOn { .. }
            | CommandKind::PowerOff { .. } => {}
            CommandKind::SetBrightness { brightness, .. } => raw.push(brightness),
            CommandKind::SetTemperature { temperature, .. } => raw.push(temperature),
            CommandKind::SetRgbw {
                red, green, blue, white, ..
            } => raw.extend_from_slice(&[red, green, blue, white]),
        }
    }
}

/// A fully encoded request frame.
///
/// Captures the frame number from [`State`] at build time and is immutable
/// afterwards; advancing the state later does not change an already-built
/// command.
#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    frame_number: u8,
    raw: Vec<u8>,
}

impl Command {
    /// Encode `kind` with the state's current frame number.
    pub fn new(state: &State, kind: CommandKind) -> Self {
        let frame_number = state.frame_number();
        let mut raw = Vec::with_capacity(12);
        raw.extend_from_slice(&HEAD);
        raw.push(kind.opcode());
        raw.push(frame_number);
        raw.push(kind.zone().unwrap_or(ZONE_NONE));
        kind.write_payload(&mut raw);
        raw.push(TAIL);
        Self {
            kind,
            frame_number,
            raw,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn frame_number(&self) -> u8 {
        self.frame_number
    }

    /// The exact bytes to put on the wire.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// A raw 64-byte reply plus the command it answers.
///
/// Reply layout:
///
/// ```text
/// [head echo 4B] [frame echo 1B] [zone 1B] [payload ...]
/// ```
///
/// The frame echo is informational only; the relay has been observed to
/// answer out of order, which the zone field check below is there to catch.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    raw: [u8; RESPONSE_LEN],
    request: CommandKind,
}

impl ResponseFrame {
    pub fn new(raw: [u8; RESPONSE_LEN], request: CommandKind) -> Self {
        Self { raw, request }
    }

    /// Build a frame from a byte slice, checking the fixed reply length.
    pub fn from_slice(bytes: &[u8], request: CommandKind) -> Result<Self> {
        let raw: [u8; RESPONSE_LEN] = bytes.try_into().map_err(|_| {
            RelayError::MalformedResponse(format!(
                "reply is {} bytes, expected {}",
                bytes.len(),
                RESPONSE_LEN
            ))
        })?;
        Ok(Self { raw, request })
    }

    pub fn raw(&self) -> &[u8; RESPONSE_LEN] {
        &self.raw
    }

    /// The pending-command descriptor this reply is paired with.
    pub fn request(&self) -> CommandKind {
        self.request
    }

    fn check_head(&self) -> Result<()> {
        if self.raw[..4] != HEAD {
            return Err(RelayError::MalformedResponse(format!(
                "bad head marker {:02x?}",
                &self.raw[..4]
            )));
        }
        Ok(())
    }

    fn check_zone(&self, expected: u8) -> Result<u8> {
        let zone = self.raw[5];
        if zone != expected {
            return Err(RelayError::MalformedResponse(format!(
                "reply is for zone {zone}, expected zone {expected}"
            )));
        }
        Ok(zone)
    }
}

fn decode_name(bytes: &[u8]) -> Result<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let name = std::str::from_utf8(&bytes[..end])
        .map_err(|_| RelayError::MalformedResponse("zone name is not valid UTF-8".to_string()))?;
    Ok(name.trim().to_string())
}

/// Decoded reply to [`CommandKind::GetZoneCount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCountResponse {
    pub count: u8,
}

impl ZoneCountResponse {
    pub fn decode(frame: &ResponseFrame) -> Result<Self> {
        if frame.request() != CommandKind::GetZoneCount {
            return Err(RelayError::MalformedResponse(format!(
                "zone-count decoder applied to a {:?} reply",
                frame.request()
            )));
        }
        frame.check_head()?;
        Ok(Self {
            count: frame.raw()[6],
        })
    }
}

/// Decoded reply to [`CommandKind::GetZoneInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfoResponse {
    pub zone: u8,
    pub kind: ZoneType,
    pub name: String,
}

impl ZoneInfoResponse {
    pub fn decode(frame: &ResponseFrame) -> Result<Self> {
        let expected = match frame.request() {
            CommandKind::GetZoneInfo { zone } => zone,
            other => {
                return Err(RelayError::MalformedResponse(format!(
                    "zone-info decoder applied to a {other:?} reply"
                )))
            }
        };
        frame.check_head()?;
        let zone = frame.check_zone(expected)?;
        let raw = frame.raw();
        let kind = ZoneType::from_wire(raw[6]).ok_or_else(|| {
            RelayError::MalformedResponse(format!("unknown zone type byte 0x{:02x}", raw[6]))
        })?;
        let name = decode_name(&raw[7..7 + ZONE_NAME_LEN])?;
        Ok(Self { zone, kind, name })
    }
}

/// Decoded reply to [`CommandKind::GetZoneName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNameResponse {
    pub zone: u8,
    pub name: String,
}

impl ZoneNameResponse {
    pub fn decode(frame: &ResponseFrame) -> Result<Self> {
        let expected = match frame.request() {
            CommandKind::GetZoneName { zone } => zone,
            other => {
                return Err(RelayError::MalformedResponse(format!(
                    "zone-name decoder applied to a {other:?} reply"
                )))
            }
        };
        frame.check_head()?;
        let zone = frame.check_zone(expected)?;
        let name = decode_name(&frame.raw()[6..6 + ZONE_NAME_LEN])?;
        Ok(Self { zone, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(frame_echo: u8, zone: u8, payload: &[u8]) -> [u8; RESPONSE_LEN] {
        let mut raw = [0u8; RESPONSE_LEN];
        raw[..4].copy_from_slice(&HEAD);
        raw[4] = frame_echo;
        raw[5] = zone;
        raw[6..6 + payload.len()].copy_from_slice(payload);
        raw
    }

    #[test]
    fn frame_number_advances_by_one() {
        let mut state = State::new();
        assert_eq!(state.frame_number(), 0);
        state.advance();
        assert_eq!(state.frame_number(), 1);
    }

    #[test]
    fn frame_number_wraps_modulo_256() {
        let mut state = State::new();
        for _ in 0..300 {
            state.advance();
        }
        assert_eq!(state.frame_number(), (300 % 256) as u8);
    }

    #[test]
    fn ping_frame_layout() {
        let state = State::new();
        let cmd = Command::new(&state, CommandKind::Ping);
        assert_eq!(cmd.raw(), &[0x55, 0xAA, 0x5A, 0xA5, 0x10, 0x00, 0x00, 0x7E]);
    }

    #[test]
    fn power_on_addresses_zone() {
        let mut state = State::new();
        state.advance();
        state.advance();
        let cmd = Command::new(&state, CommandKind::PowerOn { zone: 3 });
        assert_eq!(cmd.raw(), &[0x55, 0xAA, 0x5A, 0xA5, 0x21, 0x02, 0x03, 0x7E]);
    }

    #[test]
    fn brightness_payload_byte() {
        let state = State::new();
        let cmd = Command::new(
            &state,
            CommandKind::SetBrightness {
                zone: 1,
                brightness: 128,
            },
        );
        assert_eq!(cmd.raw()[7], 128);
        assert_eq!(*cmd.raw().last().unwrap(), TAIL);
    }

    #[test]
    fn rgbw_payload_order() {
        let state = State::new();
        let cmd = Command::new(
            &state,
            CommandKind::SetRgbw {
                zone: 2,
                red: 10,
                green: 20,
                blue: 30,
                white: 40,
            },
        );
        assert_eq!(&cmd.raw()[7..11], &[10, 20, 30, 40]);
    }

    #[test]
    fn command_captures_frame_number_at_build_time() {
        let mut state = State::new();
        state.advance();
        let cmd = Command::new(&state, CommandKind::Ping);
        state.advance();
        assert_eq!(cmd.frame_number(), 1);
        assert_eq!(cmd.raw()[5], 1);
    }

    #[test]
    fn decode_zone_count() {
        let frame = ResponseFrame::new(reply(0, 0, &[3]), CommandKind::GetZoneCount);
        let decoded = ZoneCountResponse::decode(&frame).unwrap();
        assert_eq!(decoded.count, 3);
    }

    #[test]
    fn decode_zone_info() {
        let mut payload = vec![0x03];
        payload.extend_from_slice(b"Bedroom");
        let frame = ResponseFrame::new(
            reply(1, 2, &payload),
            CommandKind::GetZoneInfo { zone: 2 },
        );
        let decoded = ZoneInfoResponse::decode(&frame).unwrap();
        assert_eq!(decoded.zone, 2);
        assert_eq!(decoded.kind, ZoneType::Cct);
        assert_eq!(decoded.name, "Bedroom");
    }

    #[test]
    fn decode_zone_info_trims_space_padding() {
        let mut payload = vec![0x01];
        payload.extend_from_slice(b"Kitchen         ");
        let frame = ResponseFrame::new(
            reply(0, 1, &payload),
            CommandKind::GetZoneInfo { zone: 1 },
        );
        let decoded = ZoneInfoResponse::decode(&frame).unwrap();
        assert_eq!(decoded.name, "Kitchen");
    }

    #[test]
    fn zone_info_for_wrong_zone_is_rejected() {
        let mut payload = vec![0x01];
        payload.extend_from_slice(b"Kitchen");
        let frame = ResponseFrame::new(
            reply(0, 1, &payload),
            CommandKind::GetZoneInfo { zone: 2 },
        );
        assert!(matches!(
            ZoneInfoResponse::decode(&frame),
            Err(RelayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn zone_info_with_unknown_type_is_rejected() {
        let frame = ResponseFrame::new(
            reply(0, 1, &[0x7F]),
            CommandKind::GetZoneInfo { zone: 1 },
        );
        assert!(matches!(
            ZoneInfoResponse::decode(&frame),
            Err(RelayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn zone_info_with_bad_head_is_rejected() {
        let mut raw = reply(0, 1, &[0x01]);
        raw[0] = 0x00;
        let frame = ResponseFrame::new(raw, CommandKind::GetZoneInfo { zone: 1 });
        assert!(matches!(
            ZoneInfoResponse::decode(&frame),
            Err(RelayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn zone_info_with_invalid_name_is_rejected() {
        let mut payload = vec![0x01];
        payload.extend_from_slice(&[0xFF, 0xFE, 0xFD]);
        let frame = ResponseFrame::new(
            reply(0, 1, &payload),
            CommandKind::GetZoneInfo { zone: 1 },
        );
        assert!(matches!(
            ZoneInfoResponse::decode(&frame),
            Err(RelayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn short_reply_is_rejected() {
        let err = ResponseFrame::from_slice(&[0u8; 10], CommandKind::GetZoneCount);
        assert!(matches!(err, Err(RelayError::MalformedResponse(_))));
    }

    #[test]
    fn decoder_rejects_mismatched_descriptor() {
        let frame = ResponseFrame::new(reply(0, 0, &[2]), CommandKind::Ping);
        assert!(matches!(
            ZoneCountResponse::decode(&frame),
            Err(RelayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn decode_zone_name() {
        let frame = ResponseFrame::new(
            reply(4, 5, b"Lounge"),
            CommandKind::GetZoneName { zone: 5 },
        );
        let decoded = ZoneNameResponse::decode(&frame).unwrap();
        assert_eq!(decoded.zone, 5);
        assert_eq!(decoded.name, "Lounge");
    }
}
