use bacprobe_core::types::{ObjectId, PropertyId};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{parse_target, report_ack, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-subcov", about = "Subscribe to change-of-value notifications")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
    #[arg(long, default_value = "presentValue")]
    property: PropertyId,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let result = client
        .subscribe_cov(args.target, args.object, args.property)
        .await;
    report_ack("subscribe-cov", args.target, result);
    Ok(())
}
