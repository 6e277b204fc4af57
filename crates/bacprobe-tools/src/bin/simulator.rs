use bacprobe_client::SimulatedDevice;
use bacprobe_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
use bacprobe_datalink::{BacnetIpTransport, BipConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "bacnet-simulator", about = "Serve a simulated BACnet device")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:47808")]
    bind: SocketAddr,
    #[arg(long, default_value = "255.255.255.255:47808")]
    broadcast: SocketAddr,
    #[arg(long, default_value_t = 1)]
    instance: u32,
}

fn sample_objects() -> Result<Vec<(ObjectId, Vec<(PropertyId, PropertyValue)>)>, Box<dyn std::error::Error>> {
    Ok(vec![
        (
            ObjectId::new(ObjectType::AnalogInput, 1)?,
            vec![
                (PropertyId::ObjectName, PropertyValue::from("Zone Temperature")),
                (PropertyId::PresentValue, PropertyValue::Real(21.5)),
                (PropertyId::OutOfService, PropertyValue::Boolean(false)),
            ],
        ),
        (
            ObjectId::new(ObjectType::AnalogValue, 1)?,
            vec![
                (PropertyId::ObjectName, PropertyValue::from("Zone Setpoint")),
                (PropertyId::PresentValue, PropertyValue::Real(22.0)),
                (PropertyId::Description, PropertyValue::from("occupied setpoint")),
            ],
        ),
        (
            ObjectId::new(ObjectType::BinaryValue, 1)?,
            vec![
                (PropertyId::ObjectName, PropertyValue::from("Fan Enable")),
                (PropertyId::PresentValue, PropertyValue::UnsignedInteger(1)),
            ],
        ),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let (transport, inbound) = BacnetIpTransport::bind(BipConfig {
        bind_addr: args.bind,
        broadcast_addr: args.broadcast,
        queue_depth: 64,
    })
    .await?;
    let local = transport.local_addr();
    let device = Arc::new(SimulatedDevice::new(args.instance, transport)?);
    for (id, properties) in sample_objects()? {
        device.add_object(id, properties).await;
    }
    println!("simulating {} on {local}", device.device_id());

    let serving = device.clone();
    let server = tokio::spawn(async move { serving.run(inbound).await });
    tokio::select! {
        _ = server => log::warn!("simulator stopped"),
        result = tokio::signal::ctrl_c() => {
            result?;
            log::info!("shutting down");
        }
    }
    Ok(())
}
