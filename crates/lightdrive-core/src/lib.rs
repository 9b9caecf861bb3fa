//! LightDrive Core - Foundational types for the LightDrive runtime
//!
//! This crate provides the types every other LightDrive crate depends on:
//! - `LoopConfig`, `FeatureFlags`, `FaultPolicy` - loop configuration
//! - `Color` - packed pixel color
//! - `FilterId` - stable filter handle identity
//! - Error types and Result alias

mod config;
mod error;
mod id;
mod types;

pub use config::{
    FaultPolicy, FeatureFlags, LoopConfig, DEFAULT_REPORT_INTERVAL_MS, DEFAULT_TICKS_PER_SECOND,
    DEFAULT_TITLE,
};
pub use error::{LightDriveError, Result};
pub use id::FilterId;
pub use types::Color;
