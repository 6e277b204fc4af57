use bacprobe_client::operations::manage_device;
use bacprobe_client::{DeviceOperation, ReinitializeKind};
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{parse_target, report_ack, resolve_device, ConnectArgs};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Operation {
    Reinitialize,
    Backup,
    Restore,
    UpdateFirmware,
    SetTime,
}

#[derive(Parser, Debug)]
#[command(name = "bacnet-devop", about = "Run a management operation on a BACnet device")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    instance: Option<u32>,
    #[arg(long, value_enum)]
    operation: Operation,
    /// Reinitialize kind, e.g. `coldstart` or `warmstart`.
    #[arg(long, default_value = "coldstart")]
    state: ReinitializeKind,
    /// Restore data, firmware image name or time string.
    #[arg(
        long,
        required_if_eq_any([("operation", "restore"), ("operation", "update-firmware"), ("operation", "set-time")])
    )]
    argument: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let argument = args.argument.unwrap_or_default();
    let op = match args.operation {
        Operation::Reinitialize => DeviceOperation::Reinitialize(args.state),
        Operation::Backup => DeviceOperation::Backup,
        Operation::Restore => DeviceOperation::Restore { data: argument },
        Operation::UpdateFirmware => DeviceOperation::UpdateFirmware { image: argument },
        Operation::SetTime => DeviceOperation::SetTime { time: argument },
    };
    let name = op.name();
    let client = args.connect.connect().await?;
    let device = resolve_device(&client, args.target, args.instance).await?;
    let result = manage_device(&client, args.target, device, op).await;
    report_ack(name, args.target, result);
    Ok(())
}
