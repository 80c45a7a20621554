//! Operator commands for a netforge database
//!
//! The `netforge` binary parses arguments and dispatches here; every command
//! writes its human-readable output to the supplied writer.

pub mod commands;
