use bacprobe_core::types::{ObjectId, PropertyId};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{
    fail, parse_assignment, parse_target, parse_value, report_ack, ConnectArgs, ValueKind,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-createobj", about = "Create an object on a BACnet device")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
    /// Initial value as `property=value`; may be repeated.
    #[arg(long = "set", value_parser = parse_assignment)]
    properties: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let mut properties = Vec::with_capacity(args.properties.len());
    for (name, text) in &args.properties {
        let property: PropertyId = name.parse().unwrap_or_else(|e| fail("bad property", e));
        let value = parse_value(text, ValueKind::Auto).unwrap_or_else(|e| fail("bad value", e));
        properties.push((property, value));
    }
    let client = args.connect.connect().await?;
    let result = client.create_object(args.target, args.object, properties).await;
    report_ack("create-object", args.target, result);
    Ok(())
}
