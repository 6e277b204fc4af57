use bacprobe_core::types::{ObjectId, PropertyId};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, resolve_device, ConnectArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bacnet-readprop", about = "Read one property of a BACnet object")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    /// Object as `type,instance`; defaults to the device object.
    #[arg(long)]
    object: Option<ObjectId>,
    #[arg(long, default_value = "objectName")]
    property: PropertyId,
    #[arg(long)]
    array_index: Option<u32>,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connect.connect().await?;
    let object = match args.object {
        Some(object) => object,
        None => resolve_device(&client, args.target, None).await?,
    };

    let result = client
        .read_property_with(args.target, object, args.property, args.array_index, None)
        .await;
    match result {
        Ok(Some(value)) if args.json => println!("{}", serde_json::to_string_pretty(&value)?),
        Ok(Some(value)) => println!("{object} {}: {value}", args.property),
        Ok(None) => {
            eprintln!("no response from {}", args.target);
            std::process::exit(1);
        }
        Err(e) => fail("read failed", e),
    }
    Ok(())
}
