//! Read a BACnet property from a device.
//!
//! Usage:
//!   cargo run -p bacprobe-client --example read_property -- --ip 192.168.1.100

use bacprobe_client::BacnetClient;
use bacprobe_core::types::{ObjectId, ObjectType, PropertyId};
use bacprobe_datalink::DataLinkAddress;
use std::net::IpAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let ip: IpAddr = std::env::args()
        .skip_while(|a| a != "--ip")
        .nth(1)
        .ok_or("usage: --ip <device-ip>")?
        .parse()?;

    let client = BacnetClient::new().await?;

    // Read the object-name of device instance 1.
    let addr = DataLinkAddress::bacnet_default(ip);
    let object_id = ObjectId::new(ObjectType::Device, 1)?;

    match client
        .read_property(addr, object_id, PropertyId::ObjectName)
        .await?
    {
        Some(value) => println!("Device object-name: {value}"),
        None => println!("No response from {addr}"),
    }
    Ok(())
}
