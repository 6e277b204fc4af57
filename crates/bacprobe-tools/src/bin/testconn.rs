use bacprobe_client::survey::{test_connection, ReadOutcome};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, resolve_device, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-testconn", about = "Check that a device answers a property read")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    instance: Option<u32>,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let device = resolve_device(&client, args.target, args.instance).await?;
    let report = match test_connection(&client, args.target, device).await {
        Ok(report) => report,
        Err(e) => fail("connection test failed", e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.outcome {
            ReadOutcome::Value(name) => println!("connected to {device} ({name}) at {}", report.address),
            ReadOutcome::NoResponse => println!("no response from {}", report.address),
            ReadOutcome::Refused(why) => println!("{} refused the read: {why}", report.address),
        }
    }
    if !report.is_connected() {
        std::process::exit(1);
    }
    Ok(())
}
