//! # Core Module / 核心模块
//!
//! This module contains the core functionality of testman: data models,
//! configuration, toolchain access, discovery, compilation and execution.
//!
//! 此模块包含 testman 的核心功能：
//! 数据模型、配置、工具链访问、发现、编译和执行。

pub mod compile;
pub mod config;
pub mod discovery;
pub mod execution;
pub mod models;
pub mod toolchain;
pub mod watchdog;

// Re-exports
pub use config::RunOptions;
pub use execution::{run_suite, run_test};
pub use models::{Package, RunReport, TestOutcome};
pub use toolchain::Toolchain;
