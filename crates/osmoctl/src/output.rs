use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use osmoctl_duml::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    msg_type: String,
    sender: String,
    receiver: String,
    id: String,
    payload_size: usize,
    payload: &'a str,
}

/// Print one decoded message on stdout.
pub fn print_message(msg: &Message, format: OutputFormat) {
    let payload = hex_string(msg.payload.as_ref());
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                msg_type: msg.msg_type.to_string(),
                sender: msg.interface.sender.to_string(),
                receiver: msg.interface.receiver.to_string(),
                id: msg.id.to_string(),
                payload_size: msg.payload.len(),
                payload: &payload,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "FROM", "TO", "ID", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    msg.msg_type.to_string(),
                    msg.interface.sender.to_string(),
                    msg.interface.receiver.to_string(),
                    msg.id.to_string(),
                    msg.payload.len().to_string(),
                    payload,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={} from={} to={} id={} size={} payload={}",
                msg.msg_type,
                msg.interface.sender,
                msg.interface.receiver,
                msg.id,
                msg.payload.len(),
                payload
            );
        }
        OutputFormat::Raw => print_raw(msg.payload.as_ref()),
    }
}

/// Print a flat set of named values on stdout.
pub fn print_fields(fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            for (key, value) in fields {
                out.insert(key.to_string(), serde_json::Value::String(value.clone()));
            }
            println!("{}", serde_json::Value::Object(out));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in fields {
                table.add_row(vec![key.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (key, value) in fields {
                println!("{key}={value}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn hex_string(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for b in data {
        s.push_str(&format!("{b:02x}"));
    }
    s
}
