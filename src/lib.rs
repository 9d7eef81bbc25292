//! Host-side monitor and control console for the garden irrigation controller.
//!
//! Polls the device's status endpoint, keeps a rolling window of readings for
//! the charts, and posts operator control commands back to it.

pub mod authority;
pub mod command;
pub mod config;
pub mod console;
pub mod debug_flags;
pub mod error;
pub mod history;
pub mod http_client;
pub mod poller;
pub mod render;
pub mod telemetry;
pub mod views;

#[cfg(test)]
mod testing;
