//! # Core Runtime Module
//!
//! Shared abstractions used throughout the runtime.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for the frame loop and script scheduler
//! - **Foundation**: Low-level utilities (collections, time, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    RuntimeConfig,
    ScriptingConfig,
    Config,
    ConfigError,
};
