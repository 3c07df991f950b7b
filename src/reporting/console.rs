//! # Console Reporting Module / 控制台报告模块
//!
//! Every line testman prints about tests and packages. Result lines follow the
//! layout of `go test` (`ok`/`FAIL`, a tab, the name) so existing log
//! scrapers keep working; only the status word is colored.
//!
//! testman 关于测试和包输出的每一行。结果行沿用 `go test` 的格式，
//! 只有状态词带颜色。

use colored::*;
use std::time::Duration;

use crate::core::models::{Package, RunReport, TestCase};
use crate::infra::t;

/// `ok\t<pkg>.<test>`
pub fn print_test_passed(case: &TestCase<'_>) {
    println!("{}\t{}", "ok".green(), case.qualified_name());
}

/// `RETRY\t<pkg>.<test>\t[test error: <status>]`, verbose mode only.
pub fn print_test_retry(case: &TestCase<'_>, status: &str) {
    println!(
        "{}\t{}\t[{}]",
        "RETRY".yellow(),
        case.qualified_name(),
        t!("report.test_error", status = status)
    );
}

/// `FAIL\t<pkg>.<test>\t[test error: <status>]`
pub fn print_test_failed(case: &TestCase<'_>, status: &str) {
    println!(
        "{}\t{}\t[{}]",
        "FAIL".red(),
        case.qualified_name(),
        t!("report.test_error", status = status)
    );
}

/// Echoes the captured output of a failed attempt.
pub fn print_attempt_output(output: &str) {
    let output = output.trim_end();
    if !output.is_empty() {
        println!("{output}");
    }
}

/// `ok\t<pkg>\t<elapsed>`
pub fn print_package_passed(package: &Package, elapsed: Duration) {
    println!("{}\t{}\t{:.3?}", "ok".green(), package, elapsed);
}

/// `FAIL\t<pkg>\t[compile error: <status>]`
pub fn print_compile_failure(package: &Package, status: &str) {
    println!(
        "{}\t{}\t[{}]",
        "FAIL".red(),
        package,
        t!("report.compile_error", status = status)
    );
}

/// Output of the `list` command for one package: its import path, then each
/// test indented by two spaces.
pub fn print_package_listing(package: &Package, tests: &[String]) {
    println!("{package}");
    for test in tests {
        println!("  {test}");
    }
}

/// `FAIL\ttimed out after <elapsed>`
pub fn print_timeout(elapsed: Duration) {
    println!(
        "{}\t{}",
        "FAIL".red(),
        t!("report.timed_out", elapsed = format!("{elapsed:.2?}"))
    );
}

/// Prints what went wrong across the run, then the total elapsed time.
///
/// 打印整个运行中的失败情况，然后打印总耗时。
///
/// # Output Format / 输出格式
/// ```text
/// --- Summary ---
///   FAIL  example.com/pkg.TestBroken (3 attempts)
///   FAIL  example.com/other [compile error]
///   flaky example.com/pkg.TestUnstable (passed on attempt 2)
/// 12 tests, 1 failed, 1 package(s) failed
/// total: 4.21s
/// ```
pub fn print_summary(report: &RunReport) {
    let failed: Vec<_> = report.failed_tests().collect();
    let flaky: Vec<_> = report.flaky_passes().collect();
    let broken: Vec<_> = report
        .packages
        .iter()
        .filter(|p| p.outcomes().is_empty() && !p.is_ok())
        .collect();

    if !failed.is_empty() || !flaky.is_empty() || !broken.is_empty() {
        println!("\n{}", t!("summary.banner").bold());
        for (package, outcome) in &failed {
            println!(
                "  {:<5} {}.{} ({})",
                "FAIL".red(),
                package,
                outcome.name(),
                t!("summary.attempts", count = outcome.attempts())
            );
        }
        for result in &broken {
            println!(
                "  {:<5} {} [{}]",
                "FAIL".red(),
                result.package(),
                t!("summary.compile_error")
            );
        }
        for (package, outcome) in &flaky {
            println!(
                "  {:<5} {}.{} ({})",
                "flaky".yellow(),
                package,
                outcome.name(),
                t!("summary.passed_on_attempt", attempt = outcome.attempts())
            );
        }
        println!(
            "{}",
            t!(
                "summary.counts",
                tests = report.test_count(),
                failed = failed.len(),
                packages = report.failed_packages()
            )
        );
    }

    println!(
        "{}",
        t!("summary.total", elapsed = format!("{:.2?}", report.elapsed))
    );
}

/// Short banner shown before the help when no subcommand was given.
pub fn print_banner() {
    println!(
        "{} {}\n",
        "testman".bold().cyan(),
        t!("cli.about").dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_messages_in_english() {
        let msg = t!("report.test_error", locale = "en", status = "exit status: 1");
        assert_eq!(msg, "test error: exit status: 1");
        let msg = t!("report.timed_out", locale = "en", elapsed = "1.00s");
        assert_eq!(msg, "timed out after 1.00s");
    }

    #[test]
    fn report_messages_in_chinese() {
        let msg = t!("summary.total", locale = "zh-CN", elapsed = "2.00s");
        assert_eq!(msg, "总耗时: 2.00s");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(t!("summary.banner", locale = "fr"), "--- Summary ---");
    }
}
