use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(report: &Value, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(report)?,
    }

    Ok(())
}

fn render_table(report: &Value) -> Result<(), CliError> {
    match report {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::String(s) => println!("{key:<26}: {s}"),
                    Value::Number(n) => println!("{key:<26}: {n}"),
                    Value::Bool(b) => println!("{key:<26}: {b}"),
                    Value::Null => println!("{key:<26}: -"),
                    nested => {
                        println!("{key}:");
                        let pretty = serde_json::to_string_pretty(nested)?;
                        for line in pretty.lines() {
                            println!("  {line}");
                        }
                    }
                }
            }
        }
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }

    Ok(())
}
