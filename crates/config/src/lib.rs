//! Configuration loading, schema types, and env substitution.
//!
//! Config files: `banter.toml`, `banter.yaml`, or `banter.json`
//! Searched in `./` then `~/.config/banter/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{discover_and_load, load_config},
    schema::{
        API_KEY_ENV, BanterConfig, ChatConfig, ModelsConfig, ProviderConfig, ReplyMode,
        ServerConfig,
    },
};
