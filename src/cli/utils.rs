use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::ClientError;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(obj) = response.as_object_mut() {
                    obj.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Client errors carry their own JSON shape (field errors, redirect)
pub fn output_client_error(output_format: &OutputFormat, err: &ClientError) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&err.to_json())?),
        OutputFormat::Text => output_error(output_format, &err.to_string(), Some(err.error_code()))?,
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output a collection, one rendered line per element in text mode
pub fn output_collection<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    heading: &str,
    items: &[T],
    render: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if items.is_empty() {
        return output_empty_collection(
            output_format,
            collection_name,
            &format!("No {} found.", collection_name),
        );
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: items
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", heading);
            for item in items {
                println!("  {}", render(item));
            }
        }
    }
    Ok(())
}

/// Read a line from stdin when a secret was not given on the command line
pub fn prompt_secret(label: &str) -> anyhow::Result<String> {
    use std::io::{BufRead, Write};

    eprint!("{}: ", label);
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
