use bacprobe_client::operations::execute_command;
use bacprobe_client::ObjectCommand;
use bacprobe_core::types::ObjectId;
use bacprobe_datalink::DataLinkAddress;
use bacprobe_tools::{fail, parse_target, parse_value, report_ack, ConnectArgs, ValueKind};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    SetValue,
    Enable,
    Disable,
    Reset,
    Acknowledge,
}

#[derive(Parser, Debug)]
#[command(name = "bacnet-command", about = "Apply a command to a BACnet object")]
struct Args {
    #[command(flatten)]
    connect: ConnectArgs,
    #[arg(long, value_parser = parse_target)]
    target: DataLinkAddress,
    #[arg(long)]
    object: ObjectId,
    #[arg(long, value_enum)]
    action: Action,
    /// New presentValue for `set-value`.
    #[arg(long, required_if_eq("action", "set-value"))]
    value: Option<String>,
    #[arg(long, value_enum, default_value_t = ValueKind::Auto)]
    kind: ValueKind,
    /// Priority for `set-value`; 16 when omitted.
    #[arg(long)]
    priority: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let cmd = match args.action {
        Action::SetValue => {
            let text = args.value.as_deref().unwrap_or_default();
            let value = parse_value(text, args.kind).unwrap_or_else(|e| fail("bad value", e));
            ObjectCommand::SetValue {
                value,
                priority: args.priority,
            }
        }
        Action::Enable => ObjectCommand::Enable,
        Action::Disable => ObjectCommand::Disable,
        Action::Reset => ObjectCommand::Reset,
        Action::Acknowledge => ObjectCommand::Acknowledge,
    };
    let name = cmd.name();
    let client = args.connect.connect().await?;
    let result = execute_command(&client, args.target, args.object, cmd).await;
    report_ack(name, args.target, result);
    Ok(())
}
