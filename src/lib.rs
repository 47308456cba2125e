//! blasmod - mod manager for Blasphemous and Blasphemous 2
//!
//! Library crate holding the mod database, dependency resolution and mod
//! lifecycle. The `blasmodcli` binary is a thin layer over [`cli`].

pub mod backup;
pub mod config;
pub mod console;
pub mod context;
pub mod database;
pub mod error;
pub mod games;
pub mod github;
pub mod http;
pub mod logging;
pub mod manager;
pub mod mods;
pub mod paths;
pub mod resolver;
pub mod sources;
pub mod utils;
pub mod version;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
