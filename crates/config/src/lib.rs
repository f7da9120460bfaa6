//! Configuration loading for petrel.
//!
//! Config file: `petrel.toml`, searched in `./` then `~/.config/petrel/`.
//! Supports `${ENV_VAR}` substitution in the raw file text, with `PETREL_*`
//! environment overrides applied on top of whatever was loaded.

pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, discover_and_load, load_config},
    schema::{ChatServiceConfig, PetrelConfig, ServerConfig},
};
