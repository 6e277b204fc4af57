use bacprobe_core::types::{ObjectId, PropertyId};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, parse_value, report_ack, ConnectArgs, ValueKind};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-writeprop", about = "Write one property of a BACnet object")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
    #[arg(long, default_value = "presentValue")]
    property: PropertyId,
    #[arg(long)]
    value: String,
    #[arg(long, value_enum, default_value_t = ValueKind::Auto)]
    kind: ValueKind,
    /// Command priority, 1 (highest) to 16.
    #[arg(long)]
    priority: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let value = parse_value(&args.value, args.kind).unwrap_or_else(|e| fail("bad value", e));
    let client = args.connect.connect().await?;
    let result = client
        .write_property(args.target, args.object, args.property, value, args.priority)
        .await;
    report_ack("write-property", args.target, result);
    Ok(())
}
