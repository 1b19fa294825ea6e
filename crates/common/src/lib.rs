//! Shared building blocks for the frontend workspace: logging setup,
//! environment lookup, URL helpers and the small wire types every crate uses.

pub mod types;
pub mod utils;
pub mod env;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use utils::url::join_url;
