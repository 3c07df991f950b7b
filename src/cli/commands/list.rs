//! # List Command Module / 列表命令模块
//!
//! This module implements the `list` command, which prints every package with
//! at least one matching test, followed by its test and example names.
//!
//! 此模块实现了 `list` 命令，打印每个至少有一个匹配测试的包及其测试和示例名称。

use anyhow::Result;

use crate::cli::Exit;
use crate::core::{RunOptions, Toolchain, discovery, watchdog::RunControl};
use crate::reporting::print_package_listing;

/// Executes the list command.
///
/// # Arguments
/// * `opts` - Resolved run options (only the filter and toolchain are used)
/// * `patterns` - Package patterns such as `./...`
pub async fn execute(opts: RunOptions, patterns: Vec<String>) -> Result<Exit> {
    let control = RunControl::new();
    let toolchain = Toolchain::new(&opts.go, control.token());

    let packages = discovery::list_packages(&toolchain, &patterns).await?;
    for package in &packages {
        let tests = discovery::list_tests(&toolchain, &package.dir, &opts.filter).await?;
        if tests.is_empty() {
            continue;
        }
        print_package_listing(package, &tests);
    }

    Ok(Exit::Success)
}
