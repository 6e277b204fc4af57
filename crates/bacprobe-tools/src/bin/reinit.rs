use bacprobe_client::ReinitializeKind;
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{parse_target, report_ack, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-reinit", about = "Send ReinitializeDevice")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long, default_value = "coldstart")]
    state: ReinitializeKind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let result = client.reinitialize_device(args.target, args.state).await;
    report_ack("reinitialize-device", args.target, result);
    Ok(())
}
