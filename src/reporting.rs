//! # Reporting Module / 报告模块
//!
//! This module handles everything testman prints about a run: per-test and
//! per-package result lines, listings, and the final summary.
//!
//! 此模块处理 testman 关于一次运行所输出的全部内容：
//! 每个测试和每个包的结果行、列表以及最终摘要。

pub mod console;

// Re-export common reporting functions
pub use console::{print_package_listing, print_summary};
