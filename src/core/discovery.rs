//! # Discovery Module / 发现模块
//!
//! Finds the packages matching the user's patterns and the tests inside them.
//!
//! 查找与用户模式匹配的包及其中的测试。

use std::path::Path;

use crate::core::config::TestFilter;
use crate::core::models::Package;
use crate::core::toolchain::{self, Toolchain};
use crate::error::{ListError, Result};

/// Lists the packages that have tests, in the toolchain's order.
///
/// On failure the captured output is also echoed to stderr, as the toolchain
/// usually explains there which pattern did not match.
///
/// 按工具链的顺序列出包含测试的包。
pub async fn list_packages(toolchain: &Toolchain, patterns: &[String]) -> Result<Vec<Package>> {
    let captured = toolchain
        .capture(toolchain.list_packages_command(patterns))
        .await?;
    if !captured.status.success() {
        eprintln!("{}", captured.output.trim_end());
        return Err(ListError::Packages {
            status: captured.status,
            output: captured.output,
        }
        .into());
    }
    let packages = toolchain::parse_package_listing(&captured.output)?;
    tracing::debug!(count = packages.len(), "listed packages");
    Ok(packages)
}

/// Lists the tests and examples of the package in `dir` that `filter` keeps.
/// An empty result is not an error.
///
/// 列出 `dir` 中被 `filter` 保留的测试和示例。结果为空不是错误。
pub async fn list_tests(
    toolchain: &Toolchain,
    dir: &Path,
    filter: &TestFilter,
) -> Result<Vec<String>> {
    let captured = toolchain.capture(toolchain.list_tests_command(dir)).await?;
    if !captured.status.success() {
        return Err(ListError::Tests {
            dir: dir.to_path_buf(),
            status: captured.status,
            output: captured.output,
        }
        .into());
    }
    let tests = toolchain::parse_test_listing(&captured.output, filter);
    tracing::debug!(dir = %dir.display(), count = tests.len(), "listed tests");
    Ok(tests)
}
