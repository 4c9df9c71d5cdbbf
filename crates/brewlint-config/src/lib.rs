//! Configuration management for brewlint.
//!
//! This crate handles loading and saving `.brewlint.yaml` files, discovering
//! the tap root in the filesystem, and turning settings into validator
//! options.

pub mod config;
pub mod tap_dir;

pub use config::{
    BrewlintConfig, CONFIG_FILE_NAME, ConfigError, load_config, load_config_file, save_config,
};
pub use tap_dir::{find_tap_root, find_tap_root_or_error, resolve_tap_root};
