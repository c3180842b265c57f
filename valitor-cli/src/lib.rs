//! Library half of the `valitor` command-line driver.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment expansion

pub mod config;
