//! Subcommand handlers.

pub mod audit;
pub mod hash;
pub mod keys;
pub mod verify;
pub mod version;

use anyhow::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
