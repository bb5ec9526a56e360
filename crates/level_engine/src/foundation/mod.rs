//! Foundation module - Core utilities and types
//!
//! Math types shared by the level core, and logging setup.

pub mod logging;
pub mod math;
