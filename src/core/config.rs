//! # Configuration Module / 配置模块
//!
//! Run options, the optional TOML config file, and Go duration syntax.
//!
//! Options are resolved once per invocation: command-line flags win over the
//! config file, which wins over the built-in defaults. The resulting
//! [`RunOptions`] is passed by reference into every component and never mutated.
//!
//! 运行选项、可选的 TOML 配置文件以及 Go 时长语法。
//! 命令行参数优先于配置文件，配置文件优先于内置默认值。

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, ListError, Result};

/// Pattern used when neither the command line nor the config file sets `-run`.
pub const DEFAULT_RUN_PATTERN: &str = "^(Test|Example)";

/// Per-test timeout handed to test binaries when no global timeout is set.
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Toolchain program used when none is configured.
pub const DEFAULT_GO: &str = "go";

/// Compiled `-run` pattern. An empty pattern matches every name.
/// 已编译的 `-run` 模式。空模式匹配所有名称。
#[derive(Debug, Clone)]
pub struct TestFilter {
    pattern: String,
    regex: Option<Regex>,
}

impl TestFilter {
    pub fn new(pattern: &str) -> std::result::Result<Self, ListError> {
        let regex = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern).map_err(|source| ListError::InvalidFilter {
                pattern: pattern.to_string(),
                source,
            })?)
        };
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// A filter that keeps every name.
    pub fn all() -> Self {
        Self {
            pattern: String::new(),
            regex: None,
        }
    }

    /// Unanchored match, like Go's `regexp.MatchString`.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().is_none_or(|re| re.is_match(name))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Serialize for TestFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

/// Everything a run needs to know, resolved from flags and the config file.
/// 一次运行所需的全部选项，由命令行参数和配置文件解析而来。
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    /// Echo subprocess output, log commands, pass `-test.v` to test binaries.
    pub verbose: bool,
    /// Which test and example names to keep.
    pub filter: TestFilter,
    /// Additional attempts after a failed one.
    pub retry: u32,
    /// Wall-clock budget for the whole run.
    #[serde(serialize_with = "serialize_go_duration")]
    pub timeout: Option<Duration>,
    /// Keep going after a package fails to compile (the run still fails).
    pub continue_on_error: bool,
    /// Stop at the first test that fails for good.
    pub fail_fast: bool,
    /// The `go` executable.
    pub go: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            filter: TestFilter {
                pattern: DEFAULT_RUN_PATTERN.to_string(),
                regex: Regex::new(DEFAULT_RUN_PATTERN).ok(),
            },
            retry: 0,
            timeout: None,
            continue_on_error: false,
            fail_fast: false,
            go: PathBuf::from(DEFAULT_GO),
        }
    }
}

impl RunOptions {
    /// Merges command-line overrides over the config file over the defaults.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let go = match (overrides.go, file.go) {
            (Some(go), _) => go,
            (None, Some(go)) => expand_path(&go)?,
            (None, None) => PathBuf::from(DEFAULT_GO),
        };

        let pattern = overrides
            .run
            .or(file.run)
            .unwrap_or_else(|| DEFAULT_RUN_PATTERN.to_string());
        let filter = TestFilter::new(&pattern)?;

        let timeout = match (overrides.timeout, file.timeout) {
            (Some(timeout), _) => Some(timeout),
            (None, Some(text)) => Some(parse_go_duration(&text).map_err(Error::Config)?),
            (None, None) => None,
        }
        .filter(|d| !d.is_zero());

        Ok(Self {
            verbose: overrides.verbose || file.verbose.unwrap_or(false),
            filter,
            retry: overrides.retry.or(file.retry).unwrap_or(0),
            timeout,
            continue_on_error: overrides.continue_on_error
                || file.continue_on_error.unwrap_or(false),
            fail_fast: overrides.fail_fast || file.fail_fast.unwrap_or(false),
            go,
        })
    }

    /// Timeout handed to each test binary invocation.
    pub fn test_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TEST_TIMEOUT)
    }
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub go: Option<PathBuf>,
    pub run: Option<String>,
    pub retry: Option<u32>,
    pub timeout: Option<Duration>,
    pub continue_on_error: bool,
    pub fail_fast: bool,
    pub verbose: bool,
}

/// Contents of a `--config` file.
///
/// ```toml
/// go = "~/sdk/go1.22/bin/go"
/// run = "^TestIntegration"
/// retry = 3
/// timeout = "10m"
/// continue-on-error = true
/// language = "en"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub go: Option<String>,
    pub run: Option<String>,
    pub retry: Option<u32>,
    pub timeout: Option<String>,
    pub continue_on_error: Option<bool>,
    pub fail_fast: Option<bool>,
    pub verbose: Option<bool>,
    pub language: Option<String>,
}

/// Reads and parses a config file.
/// 读取并解析配置文件。
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| Error::Config(format!("cannot expand {raw:?}: {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Parses a Go duration string such as `300ms`, `1.5h` or `2h45m`.
///
/// A lone `0` is accepted without a unit. Negative durations are rejected.
///
/// 解析 Go 时长字符串，例如 `300ms`、`1.5h` 或 `2h45m`。
pub fn parse_go_duration(text: &str) -> std::result::Result<Duration, String> {
    let invalid = || format!("invalid duration {text:?}");
    let s = text.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() || s.starts_with('-') {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let scale = match unit {
            "ns" => 1e0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration {text:?}")),
            other => return Err(format!("unknown unit {other:?} in duration {text:?}")),
        };
        nanos += value * scale;
        rest = tail;
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Renders a duration the way Go's flag parser reads it back.
/// 以 Go 参数解析器可读回的格式输出时长。
pub fn format_go_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else if d.subsec_nanos() % 1_000_000 == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}ns", d.as_nanos())
    }
}

fn serialize_go_duration<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&format_go_duration(*d)),
        None => serializer.serialize_none(),
    }
}
