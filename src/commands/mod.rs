//! Command implementations for the CLI
//!
//! This module contains the implementation of all CLI commands:
//! - proxy: Run the CORS forwarding proxy
//! - refresh: Update dataset prices from provider pages
//! - config: Show or validate configuration

pub mod config;
pub mod proxy;
pub mod refresh;
