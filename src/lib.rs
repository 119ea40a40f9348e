//! smartlead-cli: command-line client for the Smartlead outreach API.
#![deny(clippy::all)]

pub mod args;
pub mod client;
pub mod config;
pub mod confirm;
pub mod error;
pub mod handlers;
pub mod io;
pub mod lookup;
pub mod print;
pub mod schema;
pub mod shape;
pub mod table;
pub mod telemetry;
pub mod util;
