//! Server module for Geogate
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `init`: Server initialization and run loop

pub mod config;
mod init;
mod loader;

pub use init::run;
pub use loader::load_config;
