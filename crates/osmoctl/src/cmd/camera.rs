use crate::cmd::{open_session, ConnectArgs, GogglesArgs, StabilizationArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_fields, print_message, OutputFormat};

pub fn run_version(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args)?;
    let report = device
        .get_version()
        .map_err(|e| session_error("query version", e))?;
    print_message(&report, format);
    Ok(SUCCESS)
}

pub fn run_fcc(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args)?;
    let ack = device
        .set_fcc_enabled()
        .map_err(|e| session_error("enable fcc mode", e))?;
    print_message(&ack, format);
    Ok(SUCCESS)
}

pub fn run_goggles(args: GogglesArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args.connect)?;
    device
        .set_goggles_mode(args.mode)
        .map_err(|e| session_error("set goggles mode", e))?;
    print_fields(&[("goggles_mode", args.mode.to_string())], format);
    Ok(SUCCESS)
}

pub fn run_stabilization(args: StabilizationArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args.connect)?;
    device
        .set_image_stabilization(args.mode)
        .map_err(|e| session_error("set image stabilization", e))?;
    print_fields(&[("stabilization", args.mode.to_string())], format);
    Ok(SUCCESS)
}
