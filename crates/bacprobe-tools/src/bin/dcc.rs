use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{parse_target, report_ack, resolve_device, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-dcc", about = "Send DeviceCommunicationControl")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    instance: Option<u32>,
    /// Command string, e.g. `backup` or `set_time`.
    #[arg(long)]
    command: String,
    /// Command argument; may be repeated.
    #[arg(long = "arg")]
    arguments: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let device = resolve_device(&client, args.target, args.instance).await?;
    let result = client
        .device_communication_control(args.target, device, &args.command, &args.arguments)
        .await;
    report_ack("device-communication-control", args.target, result);
    Ok(())
}
