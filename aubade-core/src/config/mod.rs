//! Configuration types and the embedded config parser
//!
//! The firmware embeds `blind.toml` at compile time; `build.rs` validates it
//! on the host and [`parse_config`] reads it again at boot.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
