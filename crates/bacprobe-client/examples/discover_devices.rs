//! Discover BACnet devices on the local network using Who-Is.
//!
//! Usage:
//!   cargo run -p bacprobe-client --example discover_devices

use bacprobe_client::BacnetClient;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Ephemeral local port, broadcast to 255.255.255.255:47808.
    let client = BacnetClient::new().await?;

    // Broadcast a Who-Is and collect I-Am responses for 3 seconds.
    let devices = client.discover(Some(Duration::from_secs(3)), None).await?;

    if devices.is_empty() {
        println!("No devices found.");
    } else {
        for device in &devices {
            match device.device_id {
                Some(id) => println!("Device {id} at {}", device.address),
                None => println!("Device <unknown id> at {}", device.address),
            }
        }
        println!("\nDiscovered {} device(s).", devices.len());
    }

    Ok(())
}
