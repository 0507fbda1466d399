//! Rust library for controlling Skydance lighting Wi-Fi relays
//!
//! This library provides an async client for the binary control protocol
//! spoken by the Skydance Wi-Fi relay: a single persistent TCP connection
//! carrying fixed-size request/response frames that enumerate "zones"
//! (independently addressable lighting circuits) and change their power,
//! brightness, color-temperature, and RGB(W) state. It supports:
//!
//! - Zone discovery (count, hardware type, and configured name per zone)
//! - Power on/off per zone
//! - Brightness control (0-255)
//! - Color temperature control (mireds at the API boundary)
//! - RGB and RGBW color control
//! - Composite turn-on actions (power + color + brightness in one call)
//!
//! The relay is a small embedded controller that handles exactly one
//! command at a time and drops or corrupts state under back-to-back
//! writes. The client therefore serializes all commands on a connection
//! and paces them, so callers can issue requests from concurrent tasks
//! without corrupting the device.
//!
//! # Quick Start
//!
//! ```no_run
//! use skydance_relay::{RelayClient, TurnOn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect to the relay (address resolved out of band)
//!     let client = RelayClient::connect("192.168.1.100").await?;
//!
//!     // Enumerate the zones configured on the relay
//!     let zones = client.discover_zones().await?;
//!     for zone in &zones {
//!         println!("zone {}: {} ({})", zone.number(), zone.name(), zone.zone_type());
//!     }
//!
//!     // Control a zone
//!     if let Some(zone) = zones.first() {
//!         zone.turn_on(TurnOn::new().brightness(128)).await?;
//!         zone.set_rgb(255, 64, 0).await?;
//!         zone.turn_off().await?;
//!     }
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Client**: connection management, zone discovery, zone inventory
//! - **Zone**: high-level control API for one lighting circuit
//! - **Sequential writer**: one-command-at-a-time serialization and pacing
//! - **Session**: low-level TCP transport
//! - **Protocol**: binary frame encoding/decoding and frame sequencing
//! - **Convert/Types**: display-unit conversions and capability mapping

pub mod convert;
pub mod protocol;

mod client;
mod error;
mod relay_connection;
mod session;
mod types;
mod writer;
mod zone;

// Public exports
pub use client::RelayClient;
pub use error::{RelayError, Result};
pub use protocol::PORT;
pub use types::{Capabilities, ZoneType};
pub use zone::{TurnOn, Zone, ZoneState};
