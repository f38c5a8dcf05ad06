use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout, newline-terminated so runs can be piped
/// into the next command.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut out, value) {
        eprintln!("JSON serialization error: {}", e);
        return;
    }
    let _ = writeln!(out);
}
