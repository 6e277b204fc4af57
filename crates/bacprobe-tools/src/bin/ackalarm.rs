use bacprobe_core::types::ObjectId;
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{parse_target, report_ack, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-ackalarm", about = "Acknowledge an alarm on a BACnet object")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
    #[arg(long, default_value = "acknowledge")]
    action: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let result = client
        .acknowledge_alarm(args.target, args.object, &args.action)
        .await;
    report_ack("acknowledge-alarm", args.target, result);
    Ok(())
}
