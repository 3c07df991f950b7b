//! # Error Types / 错误类型
//!
//! Typed errors for every failure the orchestration can hit. The CLI layer wraps
//! these in `anyhow` for context; the library returns them directly.
//!
//! 编排过程中所有可能失败的类型化错误。

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for testman operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while discovering packages or tests.
/// 发现包或测试时的失败。
#[derive(Error, Debug)]
pub enum ListError {
    /// The package listing command exited with a non-zero status.
    #[error("listing packages failed ({status}):\n{output}")]
    Packages { status: ExitStatus, output: String },

    /// The test listing command exited with a non-zero status.
    #[error("listing tests in {} failed ({status}):\n{output}", dir.display())]
    Tests {
        dir: PathBuf,
        status: ExitStatus,
        output: String,
    },

    /// A package listing line could not be parsed.
    #[error("unparsable package listing line: {0:?}")]
    Malformed(String),

    /// The `-run` pattern is not a valid regular expression.
    #[error("invalid -run pattern {pattern:?}: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A test binary could not be built. Never retried.
/// 测试二进制文件构建失败，不会重试。
#[derive(Error, Debug)]
#[error("compiling test binary for {import_path} failed ({status})")]
pub struct CompileError {
    pub import_path: String,
    pub status: ExitStatus,
    pub output: String,
}

/// Main error type for testman
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    List(#[from] ListError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    /// One or more tests failed after exhausting their retries, or packages
    /// failed to build while `continue-on-error` was set.
    #[error("{failed_tests} test(s) failed, {failed_packages} package(s) failed")]
    TestFailure {
        failed_tests: usize,
        failed_packages: usize,
    },

    /// The global wall-clock budget was exceeded.
    #[error("timed out after {elapsed:.2?}")]
    Timeout { elapsed: Duration },

    /// The run was cancelled before it could finish.
    #[error("interrupted")]
    Interrupted,

    /// A subprocess could not be started.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Configuration file or option error.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error came from cancelling the run rather than from the work itself.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Interrupted | Error::Timeout { .. })
    }
}
