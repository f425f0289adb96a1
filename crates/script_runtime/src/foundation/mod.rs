//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the runtime:
//! - Collections and the stable merge sort used for priority ordering
//! - Time management
//! - Logging utilities

pub mod collections;
pub mod time;
pub mod logging;
