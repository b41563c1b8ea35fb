//! Status synchronization client for a personal time-tracking server.
//!
//! [`services::StatusSync`] polls the server's current status, renders it to a
//! [`display::StatusDisplay`], and wraps the state-changing API calls with
//! user notifications.

pub mod api;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod format;
pub mod host;
pub mod messages;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;
