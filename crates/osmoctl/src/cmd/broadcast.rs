use crate::cmd::{open_session, BroadcastArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run(args: BroadcastArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args.connect)?;
    let enable = !args.disable;
    device
        .configure_rtmp_broadcast(&args.url, enable)
        .map_err(|e| session_error("configure broadcast", e))?;
    let state = if enable { "enabled" } else { "disabled" };
    print_fields(
        &[("broadcast", state.to_string()), ("url", args.url)],
        format,
    );
    Ok(SUCCESS)
}
