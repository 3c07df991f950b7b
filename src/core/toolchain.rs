//! # Toolchain Module / 工具链模块
//!
//! Everything that knows what the `go` command lines look like and how their
//! text output is laid out. Other modules go through [`Toolchain`] and the
//! parsers below, so a change in the toolchain's format is a change here only.
//!
//! 所有关于 `go` 命令行形式及其文本输出格式的知识都集中在此模块。

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::core::config::{RunOptions, TestFilter, format_go_duration};
use crate::core::models::Package;
use crate::error::{Error, ListError, Result};
use crate::infra::command;

/// Suffix `go list -test` appends to the synthesized test main package.
pub const TEST_BINARY_SUFFIX: &str = ".test";

/// Template handed to `go list -f`.
pub const PACKAGE_LIST_FORMAT: &str = "{{.ImportPath}} {{.Dir}}";

/// Prefix of the summary line `go test -list` prints after the names.
const LIST_SUMMARY_PREFIX: &str = "ok ";

/// Exit status and combined output of a finished subprocess.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub output: String,
}

/// Handle on the `go` executable, bound to the cancellation token of the run.
/// 绑定到本次运行取消令牌的 `go` 可执行文件句柄。
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: PathBuf,
    cancel: CancellationToken,
}

impl Toolchain {
    pub fn new(program: impl Into<PathBuf>, cancel: CancellationToken) -> Self {
        Self {
            program: program.into(),
            cancel,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `go list -test -f '{{.ImportPath}} {{.Dir}}' <patterns...>`
    pub fn list_packages_command(&self, patterns: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["list", "-test", "-f", PACKAGE_LIST_FORMAT])
            .args(patterns);
        cmd
    }

    /// `go test -list .`, run inside the package directory.
    pub fn list_tests_command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["test", "-list", "."]).current_dir(dir);
        cmd
    }

    /// `go test -c -o <output>`, run inside the package directory.
    pub fn compile_command(&self, dir: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["test", "-c", "-o"]).arg(output).current_dir(dir);
        cmd
    }

    /// Invocation of a compiled test binary for exactly one test.
    pub fn test_binary_command(
        &self,
        binary: &Path,
        dir: &Path,
        test_name: &str,
        opts: &RunOptions,
    ) -> Command {
        let mut cmd = Command::new(binary);
        cmd.args(test_binary_args(test_name, opts)).current_dir(dir);
        cmd
    }

    /// Runs `cmd` to completion, or until the run is cancelled.
    ///
    /// A non-zero exit is not an error here; callers decide what it means.
    ///
    /// # Errors
    /// - [`Error::Interrupted`] if the run was cancelled before or during the call.
    /// - [`Error::Spawn`] if the process could not be started.
    pub async fn capture(&self, cmd: Command) -> Result<Captured> {
        let program = command::describe(&cmd);
        tracing::debug!(command = %program, "exec");

        let (status, output) = command::spawn_and_capture_until(cmd, &self.cancel)
            .await
            .ok_or(Error::Interrupted)?;
        let status = status.map_err(|source| Error::Spawn { program, source })?;
        Ok(Captured { status, output })
    }
}

/// Flags selecting exactly one test: no result caching, a timeout, optional
/// verbose reporting, and a run filter anchored on the full name.
///
/// 只选择一个测试的参数：禁用缓存、超时、可选的详细输出，以及完整锚定的运行过滤器。
pub fn test_binary_args(test_name: &str, opts: &RunOptions) -> Vec<String> {
    let mut args = vec![
        "-test.count=1".to_string(),
        format!("-test.timeout={}", format_go_duration(opts.test_timeout())),
    ];
    if opts.verbose {
        args.push("-test.v".to_string());
    }
    args.push("-test.run".to_string());
    args.push(format!("^{test_name}$"));
    args
}

/// Parses `go list -test -f '{{.ImportPath}} {{.Dir}}'` output.
///
/// Each line is `<id> <dir>`. Only ids ending in `.test` (the test main of a
/// package with tests) are kept; the suffix is stripped to get the import path.
/// Other lines, such as the package itself or its `pkg [pkg.test]` variant,
/// are skipped.
///
/// # Errors
/// [`ListError::Malformed`] when a `.test` entry carries no directory.
pub fn parse_package_listing(output: &str) -> std::result::Result<Vec<Package>, ListError> {
    let mut packages = Vec::new();
    for line in output.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let (id, dir) = match line.split_once(' ') {
            Some((id, dir)) => (id, Some(dir)),
            None => (line, None),
        };
        let Some(import_path) = id.strip_suffix(TEST_BINARY_SUFFIX) else {
            continue;
        };
        match dir.filter(|d| !d.is_empty()) {
            Some(dir) if !import_path.is_empty() => packages.push(Package::new(import_path, dir)),
            _ => return Err(ListError::Malformed(line.to_string())),
        }
    }
    Ok(packages)
}

/// Parses `go test -list .` output, keeping the names `filter` accepts.
///
/// The trailing `ok <pkg> <time>` summary and blank lines are dropped.
pub fn parse_test_listing(output: &str, filter: &TestFilter) -> Vec<String> {
    output
        .trim()
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with(LIST_SUMMARY_PREFIX))
        .filter(|line| filter.matches(line))
        .map(str::to_string)
        .collect()
}
