use bacprobe_client::survey::{enumerate_device, ReadOutcome};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, resolve_device, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-enumerate", about = "List device properties and common objects")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    /// Device instance; discovered with a direct Who-Is when omitted.
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
    let report = match enumerate_device(&client, args.target, device).await {
        Ok(report) => report,
        Err(e) => fail("enumeration failed", e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{} at {}", report.device, report.address);
    for reading in &report.properties {
        match &reading.outcome {
            ReadOutcome::Value(v) => println!("  {}: {v}", reading.property),
            ReadOutcome::NoResponse => println!("  {}: <no response>", reading.property),
            ReadOutcome::Refused(why) => println!("  {}: <{why}>", reading.property),
        }
    }
    println!("objects: {}", report.objects.len());
    for object in &report.objects {
        match object.present_value.value() {
            Some(v) => println!("  {} {} = {v}", object.object, object.object_name),
            None => println!("  {} {}", object.object, object.object_name),
        }
    }
    Ok(())
}
