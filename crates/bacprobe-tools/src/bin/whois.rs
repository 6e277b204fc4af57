use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, ConnectArgs};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bacnet-whois", about = "Discover BACnet devices with Who-Is")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    /// Send the Who-Is to this device instead of broadcasting.
    #[arg(long, value_parser = parse_target)]
    target: Option<DataLinkAddress>,
    /// Lowest device instance to ask for; requires --high.
    #[arg(long, requires = "high")]
    low: Option<u32>,
    #[arg(long, requires = "low")]
    high: Option<u32>,
    /// How long to collect I-Am replies, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    window_ms: u64,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let range = args.low.zip(args.high);
    let devices = match client
        .who_is(range, Duration::from_millis(args.window_ms), args.target)
        .await
    {
        Ok(devices) => devices,
        Err(e) => fail("who-is failed", e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }
    if devices.is_empty() {
        println!("no devices found");
    }
    for device in &devices {
        match device.device_id {
            Some(id) => println!("{} {}", device.address, id),
            None => println!("{} (undecodable I-Am)", device.address),
        }
    }
    Ok(())
}
