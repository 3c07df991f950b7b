//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures used throughout testman:
//! packages discovered from the toolchain, test cases inside them, and the
//! outcomes accumulated while running.
//!
//! 此模块定义了 testman 中使用的数据结构：
//! 从工具链发现的包、包中的测试用例，以及运行过程中累积的结果。

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A package that has at least one test file.
/// Identity is the import path; `dir` is where its sources live.
///
/// 至少包含一个测试文件的包。以导入路径作为标识。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub import_path: String,
    pub dir: PathBuf,
}

impl Package {
    pub fn new(import_path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            dir: dir.into(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.import_path)
    }
}

/// A single test or example function of a package.
#[derive(Debug, Clone, Copy)]
pub struct TestCase<'a> {
    pub package: &'a Package,
    pub name: &'a str,
}

impl<'a> TestCase<'a> {
    pub fn new(package: &'a Package, name: &'a str) -> Self {
        Self { package, name }
    }

    /// `<import path>.<test name>`, the form used in every report line.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package.import_path, self.name)
    }
}

/// Final state of one test after all of its attempts.
/// 一个测试在所有尝试之后的最终状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// The test passed. `attempts` is 1 when it passed on the first try.
    /// 测试通过。第一次尝试就通过时 `attempts` 为 1。
    Passed {
        name: String,
        attempts: u32,
        duration: Duration,
    },
    /// The test failed on every attempt.
    /// 测试在每次尝试中都失败了。
    Failed {
        name: String,
        attempts: u32,
        duration: Duration,
        /// Exit status of the last attempt, as displayed to the user.
        status: String,
        /// Captured output of the last attempt.
        output: String,
    },
}

impl TestOutcome {
    pub fn name(&self) -> &str {
        match self {
            TestOutcome::Passed { name, .. } | TestOutcome::Failed { name, .. } => name,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            TestOutcome::Passed { attempts, .. } | TestOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TestOutcome::Passed { duration, .. } | TestOutcome::Failed { duration, .. } => {
                *duration
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }

    /// Passed, but only after at least one failed attempt.
    pub fn is_flaky_pass(&self) -> bool {
        matches!(self, TestOutcome::Passed { attempts, .. } if *attempts > 1)
    }
}

/// What happened to one package during a `test` run.
#[derive(Debug, Clone)]
pub enum PackageResult {
    /// The test binary was built and its tests were run (possibly not all of
    /// them, when the run stopped early).
    Completed {
        package: Package,
        outcomes: Vec<TestOutcome>,
        duration: Duration,
    },
    /// The test binary could not be built; no test of the package ran.
    CompileFailed { package: Package, status: String },
}

impl PackageResult {
    pub fn package(&self) -> &Package {
        match self {
            PackageResult::Completed { package, .. } | PackageResult::CompileFailed { package, .. } => {
                package
            }
        }
    }

    /// A package is ok iff it compiled and every test in it passed.
    pub fn is_ok(&self) -> bool {
        match self {
            PackageResult::Completed { outcomes, .. } => outcomes.iter().all(|o| !o.is_failure()),
            PackageResult::CompileFailed { .. } => false,
        }
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        match self {
            PackageResult::Completed { outcomes, .. } => outcomes,
            PackageResult::CompileFailed { .. } => &[],
        }
    }
}

/// Accumulated results of a whole `test` run.
/// 整个 `test` 运行的累积结果。
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub packages: Vec<PackageResult>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn push(&mut self, result: PackageResult) {
        self.packages.push(result);
    }

    /// Every failed test, paired with the package it belongs to.
    pub fn failed_tests(&self) -> impl Iterator<Item = (&Package, &TestOutcome)> {
        self.packages.iter().flat_map(|p| {
            p.outcomes()
                .iter()
                .filter(|o| o.is_failure())
                .map(move |o| (p.package(), o))
        })
    }

    /// Tests that needed more than one attempt to pass.
    pub fn flaky_passes(&self) -> impl Iterator<Item = (&Package, &TestOutcome)> {
        self.packages.iter().flat_map(|p| {
            p.outcomes()
                .iter()
                .filter(|o| o.is_flaky_pass())
                .map(move |o| (p.package(), o))
        })
    }

    pub fn failed_packages(&self) -> usize {
        self.packages.iter().filter(|p| !p.is_ok()).count()
    }

    pub fn test_count(&self) -> usize {
        self.packages.iter().map(|p| p.outcomes().len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.packages.iter().all(PackageResult::is_ok)
    }
}
