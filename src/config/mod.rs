//! Input files: the run state and declared configuration.
pub mod declared;
pub mod toml_loader;
