use osmoctl_duml::{DeviceType, ImageStabilization};
use osmoctl_session::LiveStreamConfig;
use tracing::info;

use crate::cmd::{cancel_on_ctrlc, open_session, ConnectArgs, StreamArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args.connect)?;
    let cancel = cancel_on_ctrlc()?;

    let mut config = LiveStreamConfig::new(&args.url);
    config.resolution = args.resolution;
    config.bitrate_kbps = args.bitrate;
    config.fps = args.fps;

    device
        .prepare_to_live_stream(&cancel)
        .map_err(|e| session_error("prepare stream", e))?;

    if let (Some(ssid), Some(psk)) = (&args.wifi_ssid, &args.wifi_psk) {
        info!(ssid = %ssid, "asking the camera to join wifi");
        device
            .connect_to_wifi(ssid, psk)
            .map_err(|e| session_error("join wifi network", e))?;
    }

    // Stabilization only responds on the action-camera models.
    if matches!(
        device.device_type(),
        DeviceType::OsmoAction4 | DeviceType::OsmoAction5Pro
    ) {
        device
            .set_image_stabilization(ImageStabilization::RockSteadyPlus)
            .map_err(|e| session_error("set image stabilization", e))?;
    }

    device
        .live_stream(&config, &cancel, |status| {
            info!(capacity = status.capacity_percent, "battery status");
        })
        .map_err(|e| session_error("live stream", e))?;

    // Cancelled; tear the stream down before reporting.
    device
        .stop_live_stream()
        .map_err(|e| session_error("stop stream", e))?;
    print_fields(&[("stream", "stopped".to_string())], format);
    Ok(SUCCESS)
}

pub fn run_stop(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let device = open_session(&args)?;
    device
        .stop_live_stream()
        .map_err(|e| session_error("stop stream", e))?;
    print_fields(&[("stream", "stopped".to_string())], format);
    Ok(SUCCESS)
}
