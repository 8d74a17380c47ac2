use osmoctl_session::CancelToken;
use tracing::info;

use crate::cmd::{cancel_on_ctrlc, open_session, ConnectArgs, ConnectWifiArgs, PairArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run_ap_info(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args)?;
    let (ssid, psk) = device
        .camera_ap_info(&CancelToken::new())
        .map_err(|e| session_error("query access point info", e))?;
    print_fields(&[("ssid", ssid), ("psk", psk)], format);
    Ok(SUCCESS)
}

pub fn run_connect_wifi(args: ConnectWifiArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args.connect)?;
    device
        .connect_to_wifi(&args.ssid, &args.psk)
        .map_err(|e| session_error("join wifi network", e))?;
    print_fields(&[("joined", args.ssid)], format);
    Ok(SUCCESS)
}

pub fn run_pair(args: PairArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args.connect)?;
    let cancel = cancel_on_ctrlc()?;
    info!(pin = %args.pin, "approve the PIN on the camera display");
    device
        .pair_with_pin(&args.pin, &cancel)
        .map_err(|e| session_error("pair", e))?;
    print_fields(&[("paired", "true".to_string())], format);
    Ok(SUCCESS)
}
