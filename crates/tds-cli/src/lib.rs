//! CLI library components for Ticket Draft Studio.

pub mod config;
pub mod logging;
