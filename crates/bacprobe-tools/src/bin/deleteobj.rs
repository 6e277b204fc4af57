use bacprobe_core::types::ObjectId;
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{parse_target, report_ack, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-deleteobj", about = "Delete an object from a BACnet device")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let result = client.delete_object(args.target, args.object).await;
    report_ack("delete-object", args.target, result);
    Ok(())
}
