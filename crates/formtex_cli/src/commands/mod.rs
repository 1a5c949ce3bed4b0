//! Subcommand handlers.

pub mod convert;
pub mod subscript;
pub mod sync;

use std::io::{self, Read};

use anyhow::{Context, Result};

/// The positional argument, or all of stdin when it is absent. A single
/// trailing newline is dropped.
pub(crate) fn read_input(arg: Option<String>) -> Result<String> {
    if let Some(text) = arg {
        return Ok(text);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read input from stdin")?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}
