//! CLI command implementations.
//!
//! - **model**: load a Python tree and print its class models
//! - **init**: write a default `.classmap.toml`

pub mod init;
pub mod model;

pub use init::init_config;
pub use model::{build_models, handle_model, ModelCommandConfig};
