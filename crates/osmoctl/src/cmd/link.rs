use std::time::{Duration, Instant};

use osmoctl_duml::wifi::{kind_name, wh_type_name, StatusReport, KIND_STANDARD};
use osmoctl_session::WifiController;
use tracing::debug;

use crate::cmd::{cancel_on_ctrlc, parse_duration, LinkArgs, StartVideoArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{hex_string, print_fields, OutputFormat};

pub fn run_status(args: LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let controller =
        WifiController::connect(args.addr.as_str()).map_err(|e| session_error("connect", e))?;
    controller
        .send_handshake()
        .map_err(|e| session_error("handshake", e))?;

    let report = wait_for_report(&controller, timeout)?;
    let streams = report
        .streams
        .iter()
        .map(|s| {
            format!(
                "mtu={} interval={}ms quality={}",
                s.mtu, s.frame_interval, s.quality
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    print_fields(
        &[
            ("product_info", hex_string(&report.product_info)),
            ("streams", streams),
        ],
        format,
    );
    Ok(SUCCESS)
}

fn wait_for_report<T: osmoctl_transport::Transport>(
    controller: &WifiController<T>,
    timeout: Duration,
) -> CliResult<StatusReport> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let packet = match controller
            .recv_packet(Duration::from_millis(200))
            .map_err(|e| session_error("receive packet", e))?
        {
            Some(packet) => packet,
            None => continue,
        };
        if packet.kind != KIND_STANDARD {
            continue;
        }
        match StatusReport::parse(&packet.payload) {
            Ok(report) => return Ok(report),
            Err(e) => debug!(error = %e, "packet is not a status report"),
        }
    }
    Err(CliError::new(
        TIMEOUT,
        format!("no status report within {timeout:?}"),
    ))
}

pub fn run_start_video(args: StartVideoArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.link.timeout)?;
    let controller = WifiController::connect(args.link.addr.as_str())
        .map_err(|e| session_error("connect", e))?;
    controller
        .send_handshake()
        .map_err(|e| session_error("handshake", e))?;
    controller
        .send_video_handshake()
        .map_err(|e| session_error("video handshake", e))?;

    let cancel = cancel_on_ctrlc()?;
    let mut seen: u64 = 0;
    while !cancel.is_cancelled() {
        let packet = match controller
            .recv_packet(timeout)
            .map_err(|e| session_error("receive packet", e))?
        {
            Some(packet) => packet,
            None => break,
        };
        seen += 1;
        print_fields(
            &[
                ("kind", kind_name(packet.kind).to_string()),
                ("wh_type", wh_type_name(packet.wh_type).to_string()),
                ("size", packet.payload.len().to_string()),
            ],
            format,
        );
        if args.count.is_some_and(|n| seen >= n) {
            break;
        }
    }

    // Leave the link quiet on the way out.
    controller
        .send_stop_streaming()
        .map_err(|e| session_error("stop streaming", e))?;
    Ok(SUCCESS)
}
