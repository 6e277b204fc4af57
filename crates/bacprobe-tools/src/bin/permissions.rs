use bacprobe_client::survey::{check_permissions, ReadOutcome};
use bacprobe_client::WriteOutcome;
use bacprobe_core::types::ObjectId;
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-permissions", about = "Probe which properties of an object can be read and written")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let report = match check_permissions(&client, args.target, args.object).await {
        Ok(report) => report,
        Err(e) => fail("permission check failed", e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{} at {}", report.object, report.address);
    println!("read:");
    for reading in &report.reads {
        let status = match &reading.outcome {
            ReadOutcome::Value(v) => format!("ok ({v})"),
            ReadOutcome::NoResponse => "no response".to_string(),
            ReadOutcome::Refused(why) => format!("denied ({why})"),
        };
        println!("  {}: {status}", reading.property);
    }
    println!("write:");
    for check in &report.writes {
        let status = match &check.outcome {
            WriteOutcome::Writable if check.restored => "writable".to_string(),
            WriteOutcome::Writable => "writable (not restored)".to_string(),
            WriteOutcome::Denied(why) => format!("denied ({why})"),
            WriteOutcome::NoResponse => "no response".to_string(),
        };
        println!("  {}: {status}", check.property);
    }
    Ok(())
}
