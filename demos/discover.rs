//! Connect to a relay, enumerate its zones, and print the inventory.
//!
//! Usage: `cargo run --example discover -- <host> [mac]`

use skydance_relay::{RelayClient, PORT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let host = match args.next() {
        Some(host) => host,
        None => {
            eprintln!("usage: discover <host> [mac]");
            std::process::exit(2);
        }
    };
    let mac = args.next();

    let client = RelayClient::connect_to(host, PORT, mac).await?;
    let zones = client.discover_zones().await?;

    println!("{} zone(s) on {}:", zones.len(), client.host());
    for zone in &zones {
        let caps = zone.capabilities();
        let mut controls = vec!["power"];
        if caps.brightness {
            controls.push("brightness");
        }
        if caps.color_temp {
            controls.push("color temp");
        }
        if caps.rgbw {
            controls.push("RGBW");
        } else if caps.rgb {
            controls.push("RGB");
        }
        println!(
            "  {:>3}  {:<18} {:<8} [{}]",
            zone.number(),
            zone.name(),
            zone.zone_type().to_string(),
            controls.join(", ")
        );
    }

    client.close().await?;
    Ok(())
}
