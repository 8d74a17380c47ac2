use osmoctl_duml::SimulatorData;
use tracing::debug;

use crate::cmd::{cancel_on_ctrlc, open_session, parse_duration, SimulatorArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run(args: SimulatorArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let device = open_session(&args.connect)?;
    let cancel = cancel_on_ctrlc()?;

    let data = SimulatorData::default();
    let mut sent: u64 = 0;
    while !cancel.is_cancelled() {
        device
            .send_simulator_data(&data)
            .map_err(|e| session_error("send simulator frame", e))?;
        sent += 1;
        debug!(sent, "sent simulator frame");
        if args.count.is_some_and(|n| sent >= n) {
            break;
        }
        std::thread::sleep(interval);
    }

    print_fields(&[("frames_sent", sent.to_string())], format);
    Ok(SUCCESS)
}
