//! CLI command implementations.

pub mod check;
pub mod common;
pub mod init;
pub mod params;
pub mod render;
