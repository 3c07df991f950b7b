//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module runs compiled test binaries one test at a time, retrying failed
//! tests up to the configured budget, and drives a whole `test` run package by
//! package.
//!
//! 此模块逐个运行已编译测试二进制中的测试，按配置的次数重试失败的测试，
//! 并逐个包地驱动整个 `test` 运行。

use std::path::Path;
use std::time::Instant;

use crate::core::models::{Package, PackageResult, RunReport, TestCase, TestOutcome};
use crate::core::toolchain::Toolchain;
use crate::core::{compile, config::RunOptions, discovery};
use crate::error::{Error, Result};
use crate::reporting::console;

/// Runs a single test until it passes or its retry budget is spent.
///
/// Attempts are numbered from 1 to `retry + 1`; the first success ends the
/// loop. Every attempt is a fresh process, so no state leaks between them.
///
/// # Arguments
/// * `case` - The test to run and the package it belongs to
/// * `binary` - The compiled test binary of that package
/// * `opts` - Run options (retry budget, verbosity, timeout)
///
/// # Returns
/// The final [`TestOutcome`]. A failing test is an `Ok` value; errors are
/// reserved for cancellation and for binaries that cannot be started.
///
/// 运行单个测试，直到通过或重试次数用尽。
pub async fn run_test(
    toolchain: &Toolchain,
    case: TestCase<'_>,
    binary: &Path,
    opts: &RunOptions,
) -> Result<TestOutcome> {
    let max_attempts = opts.retry.saturating_add(1);
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let cmd = toolchain.test_binary_command(binary, &case.package.dir, case.name, opts);
        let captured = toolchain.capture(cmd).await?;

        if captured.status.success() {
            console::print_test_passed(&case);
            return Ok(TestOutcome::Passed {
                name: case.name.to_string(),
                attempts: attempt,
                duration: start.elapsed(),
            });
        }

        let status = captured.status.to_string();
        let exhausted = attempt >= max_attempts;
        if exhausted {
            console::print_test_failed(&case, &status);
        } else if opts.verbose {
            console::print_test_retry(&case, &status);
        }
        if opts.verbose {
            console::print_attempt_output(&captured.output);
        }

        if exhausted {
            return Ok(TestOutcome::Failed {
                name: case.name.to_string(),
                attempts: attempt,
                duration: start.elapsed(),
                status,
                output: captured.output,
            });
        }
        tracing::debug!(test = %case.qualified_name(), attempt, max_attempts, "retrying");
    }
}

/// Runs every test of every package matching `patterns`.
///
/// Packages without a matching test are skipped silently. A compile failure
/// aborts the run with its error unless `continue_on_error` is set, in which
/// case the package is recorded as failed and the run moves on. With
/// `fail_fast`, the first test that fails for good ends the run.
///
/// 运行与 `patterns` 匹配的所有包中的所有测试。
pub async fn run_suite(
    toolchain: &Toolchain,
    opts: &RunOptions,
    patterns: &[String],
    work_dir: &Path,
) -> Result<RunReport> {
    let start = Instant::now();
    let mut report = RunReport::default();

    let packages = discovery::list_packages(toolchain, patterns).await?;

    for package in &packages {
        let tests = discovery::list_tests(toolchain, &package.dir, &opts.filter).await?;
        if tests.is_empty() {
            continue;
        }

        let (result, stop) = run_package(toolchain, opts, package, &tests, work_dir).await?;
        report.push(result);
        if stop {
            tracing::debug!(package = %package, "stopping after first failure");
            break;
        }
    }

    report.elapsed = start.elapsed();
    Ok(report)
}

/// Compiles one package and runs its tests. The flag tells the caller to stop.
async fn run_package(
    toolchain: &Toolchain,
    opts: &RunOptions,
    package: &Package,
    tests: &[String],
    work_dir: &Path,
) -> Result<(PackageResult, bool)> {
    let package_start = Instant::now();

    let binary = match compile::compile_test_binary(toolchain, package, work_dir).await {
        Ok(binary) => binary,
        Err(Error::Compile(err)) => {
            let status = err.status.to_string();
            console::print_compile_failure(package, &status);
            if !opts.continue_on_error {
                return Err(err.into());
            }
            let result = PackageResult::CompileFailed {
                package: package.clone(),
                status,
            };
            return Ok((result, false));
        }
        Err(e) => return Err(e),
    };

    let mut outcomes = Vec::with_capacity(tests.len());
    let mut stop = false;
    for name in tests {
        let outcome = run_test(toolchain, TestCase::new(package, name), &binary, opts).await?;
        let failed = outcome.is_failure();
        outcomes.push(outcome);
        if failed && opts.fail_fast {
            stop = true;
            break;
        }
    }

    let duration = package_start.elapsed();
    let result = PackageResult::Completed {
        package: package.clone(),
        outcomes,
        duration,
    };
    if result.is_ok() {
        console::print_package_passed(package, duration);
    }
    Ok((result, stop))
}
