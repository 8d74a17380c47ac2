use osmoctl_duml::DeviceType;

use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{hex_string, print_fields, OutputFormat};

pub fn run(args: crate::cmd::IdentifyArgs, format: OutputFormat) -> CliResult<i32> {
    let data = unhex(&args.data)?;
    let device = DeviceType::from_manufacturer_data(&data).ok_or_else(|| {
        CliError::new(
            DATA_INVALID,
            format!("manufacturer data {} is not a known device", args.data),
        )
    })?;
    print_fields(
        &[
            ("device", device.to_string()),
            ("model_magic", hex_string(&device.model_magic())),
        ],
        format,
    );
    Ok(SUCCESS)
}

fn unhex(input: &str) -> CliResult<Vec<u8>> {
    let input = input.trim();
    if !input.is_ascii() {
        return Err(CliError::new(
            USAGE,
            format!("hex string {input:?} has non-hex digits"),
        ));
    }
    if input.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("hex string {input:?} has an odd number of digits"),
        ));
    }
    (0..input.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&input[i..i + 2], 16).map_err(|_| {
                CliError::new(USAGE, format!("hex string {input:?} has non-hex digits"))
            })
        })
        .collect()
}
