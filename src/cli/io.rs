//! JSON output for the CLI
//!
//! Every command writes exactly one JSON object to stdout:
//! - `{"status":"ok","data":...}` on success
//! - `{"status":"error","code":...,"message":...}` on failure

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

pub fn success(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

pub fn failure(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&success(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&failure(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_envelopes() {
        assert_eq!(success(json!({ "a": 1 }))["status"], "ok");
        assert_eq!(success(Value::Null)["data"], Value::Null);

        let err = failure("KV_NOT_FOUND", "no document");
        assert_eq!(err["status"], "error");
        assert_eq!(err["code"], "KV_NOT_FOUND");
        assert_eq!(err["message"], "no document");
    }
}
