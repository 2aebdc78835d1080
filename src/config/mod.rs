//! Configuration management
//!
//! This module handles basic configuration settings for a ledger node,
//! limited to the network address it serves on. Ledger state itself is
//! never configured globally; every component takes explicit handles.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
