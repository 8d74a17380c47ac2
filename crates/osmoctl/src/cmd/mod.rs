use std::time::Duration;

use clap::{Args, Subcommand};
use osmoctl_duml::{DeviceType, Fps, GogglesMode, ImageStabilization, Resolution};
use osmoctl_session::{CancelToken, Device, DeviceConfig, WifiDumlTransport, DEFAULT_PIN};
use osmoctl_transport::UdpTransport;

use crate::exit::{self, session_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod battery;
pub mod broadcast;
pub mod camera;
pub mod identify;
pub mod link;
pub mod simulator;
pub mod stream;
pub mod wifi;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Push the camera feed to an RTMP endpoint until interrupted.
    Stream(StreamArgs),
    /// Stop a running live stream.
    StopStream(ConnectArgs),
    /// Query the battery charge level.
    Battery(ConnectArgs),
    /// Read the firmware version report.
    Version(ConnectArgs),
    /// Read the SSID and password of the camera's access point.
    ApInfo(ConnectArgs),
    /// Ask the camera to join a WiFi network.
    ConnectWifi(ConnectWifiArgs),
    /// Run the pairing handshake.
    Pair(PairArgs),
    /// Switch the radio into FCC mode.
    Fcc(ConnectArgs),
    /// Switch goggles between normal and USB mode.
    Goggles(GogglesArgs),
    /// Set the electronic image stabilization mode.
    Stabilization(StabilizationArgs),
    /// Enable or disable the built-in RTMP broadcast target.
    Broadcast(BroadcastArgs),
    /// Feed centered virtual-stick frames to the remote controller.
    Simulator(SimulatorArgs),
    /// Print the link status report from the control port.
    Status(LinkArgs),
    /// Trigger video transmission and print incoming packets.
    StartVideo(StartVideoArgs),
    /// Identify a device model from BLE manufacturer data.
    Identify(IdentifyArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Stream(args) => stream::run(args, format),
        Command::StopStream(args) => stream::run_stop(args, format),
        Command::Battery(args) => battery::run(args, format),
        Command::Version(args) => camera::run_version(args, format),
        Command::ApInfo(args) => wifi::run_ap_info(args, format),
        Command::ConnectWifi(args) => wifi::run_connect_wifi(args, format),
        Command::Pair(args) => wifi::run_pair(args, format),
        Command::Fcc(args) => camera::run_fcc(args, format),
        Command::Goggles(args) => camera::run_goggles(args, format),
        Command::Stabilization(args) => camera::run_stabilization(args, format),
        Command::Broadcast(args) => broadcast::run(args, format),
        Command::Simulator(args) => simulator::run(args, format),
        Command::Status(args) => link::run_status(args, format),
        Command::StartVideo(args) => link::run_start_video(args, format),
        Command::Identify(args) => identify::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Device control address.
    #[arg(long, value_name = "ADDR", default_value = "192.168.2.1:9004")]
    pub addr: String,
    /// Request timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "10s")]
    pub timeout: String,
    /// Device model; a few commands embed model-specific bytes.
    #[arg(long, value_name = "MODEL", default_value = "osmo-action4")]
    pub device: DeviceType,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// RTMP URL to publish to.
    pub url: String,
    /// Stream resolution: 480p, 720p or 1080p.
    #[arg(long, default_value = "1080p")]
    pub resolution: Resolution,
    /// Stream bitrate in kbit/s.
    #[arg(long, default_value = "6000")]
    pub bitrate: u16,
    /// Stream frame rate: 24, 25 or 30.
    #[arg(long, default_value = "30")]
    pub fps: Fps,
    /// Make the camera join this WiFi network before streaming.
    #[arg(long, requires = "wifi_psk")]
    pub wifi_ssid: Option<String>,
    /// Password for --wifi-ssid.
    #[arg(long, requires = "wifi_ssid")]
    pub wifi_psk: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConnectWifiArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Network name to join.
    pub ssid: String,
    /// Network password.
    pub psk: String,
}

#[derive(Args, Debug)]
pub struct PairArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// PIN shown on the camera display.
    #[arg(long, default_value = DEFAULT_PIN)]
    pub pin: String,
}

#[derive(Args, Debug)]
pub struct GogglesArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Goggles mode: normal or usb.
    pub mode: GogglesMode,
}

#[derive(Args, Debug)]
pub struct StabilizationArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Stabilization mode: off, rocksteady, horizonsteady,
    /// rocksteady-plus or horizon-balancing.
    pub mode: ImageStabilization,
}

#[derive(Args, Debug)]
pub struct BroadcastArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// RTMP URL the camera should broadcast to.
    pub url: String,
    /// Disable the broadcast target instead of enabling it.
    #[arg(long)]
    pub disable: bool,
}

#[derive(Args, Debug)]
pub struct SimulatorArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Delay between simulator frames (e.g. 50ms).
    #[arg(long, default_value = "50ms")]
    pub interval: String,
    /// Exit after sending N frames.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Device control address.
    #[arg(long, value_name = "ADDR", default_value = "192.168.2.1:9004")]
    pub addr: String,
    /// How long to wait for the report (e.g. 5s, 500ms).
    #[arg(long, default_value = "10s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct StartVideoArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N packets.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// BLE manufacturer data as a hex string, e.g. aa081400.
    pub data: String,
}

/// The WiFi session every device command runs over.
pub type WifiDevice = Device<WifiDumlTransport<UdpTransport>>;

/// Dial the control port, run the app handshake and wait for the first
/// status notification.
pub fn open_session(args: &ConnectArgs) -> CliResult<WifiDevice> {
    let timeout = parse_duration(&args.timeout)?;
    let transport = WifiDumlTransport::connect(args.addr.as_str())
        .map_err(|e| session_error("connect", e))?;
    transport
        .handshake()
        .map_err(|e| session_error("handshake", e))?;

    let mut config = DeviceConfig::default();
    config.request_timeout = timeout;
    let device = Device::with_config(transport, args.device, config);
    device
        .init(timeout)
        .map_err(|e| session_error("waiting for device status", e))?;
    Ok(device)
}

/// Cancel the token on Ctrl-C so in-flight waits unwind cleanly.
pub fn cancel_on_ctrlc() -> CliResult<CancelToken> {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    ctrlc::set_handler(move || token.cancel())
        .map_err(|e| CliError::new(exit::INTERNAL, format!("install signal handler: {e}")))?;
    Ok(cancel)
}

/// Parse durations like `5s`, `500ms` or a bare seconds count.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let usage = || CliError::new(exit::USAGE, format!("invalid duration {input:?}"));

    let duration = if let Some(ms) = input.strip_suffix("ms") {
        Duration::from_millis(ms.parse().map_err(|_| usage())?)
    } else if let Some(secs) = input.strip_suffix('s') {
        Duration::from_secs(secs.parse().map_err(|_| usage())?)
    } else {
        Duration::from_secs(input.parse().map_err(|_| usage())?)
    };

    if duration.is_zero() {
        return Err(CliError::new(
            exit::USAGE,
            format!("duration {input:?} must be greater than zero"),
        ));
    }
    Ok(duration)
}
