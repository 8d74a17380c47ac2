use osmoctl_session::CancelToken;

use crate::cmd::{open_session, ConnectArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args)?;
    let status = device
        .get_battery_info(&CancelToken::new())
        .map_err(|e| session_error("query battery", e))?;
    print_fields(
        &[("capacity_percent", status.capacity_percent.to_string())],
        format,
    );
    Ok(SUCCESS)
}
