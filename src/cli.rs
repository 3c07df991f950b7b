// src/cli.rs
use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::core::config::{self, FileConfig, Overrides, RunOptions, parse_go_duration};
use crate::infra::t;
use crate::reporting::console;

pub mod commands;

/// How the process should exit when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The command ran and everything passed.
    Success,
    /// Help was shown instead of running anything (missing patterns, no
    /// subcommand, bad flags). Distinct from an error exit.
    Help,
}

impl Exit {
    pub const HELP_CODE: u8 = 2;
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Help => ExitCode::from(Exit::HELP_CODE),
        }
    }
}

/// Flags that Go users spell with a single dash (`-run`, `-retry=3`).
const GO_STYLE_FLAGS: &[&str] = &[
    "run",
    "retry",
    "timeout",
    "continue-on-error",
    "failfast",
    "fail-fast",
    "verbose",
    "lang",
    "config",
    "go",
];

const TEST_EXAMPLES: &str = "EXAMPLES
   testman test ./...
   testman test -v ./...
   testman test -run ^TestUnstable -timeout=300s -retry=50 ./...";

const LIST_EXAMPLES: &str = "EXAMPLES
   testman list ./...
   testman list -v ./...
   testman list -run ^TestStable ./...";

/// Rewrites Go-style single-dash long flags into the `--flag` form clap parses.
/// Everything after a bare `--` is left alone, as is the program name.
///
/// 将 Go 风格的单横线长参数改写为 clap 可解析的 `--flag` 形式。
pub fn normalize_go_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut normalized = Vec::new();
    let mut passthrough = false;
    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || passthrough {
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }
        let is_go_style = arg
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .map(|rest| rest.split_once('=').map_or(rest, |(name, _)| name))
            .is_some_and(|name| GO_STYLE_FLAGS.contains(&name));
        if is_go_style {
            normalized.push(format!("-{arg}"));
        } else {
            normalized.push(arg);
        }
    }
    normalized
}

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language(args: &[String]) -> Option<String> {
    args.iter().enumerate().find_map(|(pos, arg)| {
        if arg == "--lang" {
            args.get(pos + 1).cloned()
        } else {
            arg.strip_prefix("--lang=").map(str::to_string)
        }
    })
}

fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help(t!("arg.verbose").to_string())
        .action(ArgAction::SetTrue)
}

fn run_arg() -> Arg {
    Arg::new("run")
        .long("run")
        .help(t!("arg.run", default = config::DEFAULT_RUN_PATTERN).to_string())
        .value_name("PATTERN")
        .allow_hyphen_values(true)
        .action(ArgAction::Set)
}

fn patterns_arg() -> Arg {
    Arg::new("patterns")
        .help(t!("arg.patterns").to_string())
        .value_name("PATTERNS")
        .num_args(0..)
        .action(ArgAction::Append)
}

pub fn build_cli() -> Command {
    Command::new("testman")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help(t!("arg.config").to_string())
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("go")
                .long("go")
                .help(t!("arg.go").to_string())
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("test")
                .about(t!("cmd_test.about").to_string())
                .after_help(TEST_EXAMPLES)
                .arg(verbose_arg())
                .arg(run_arg())
                .arg(
                    Arg::new("retry")
                        .long("retry")
                        .help(t!("arg.retry").to_string())
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help(t!("arg.timeout").to_string())
                        .value_name("DURATION")
                        .value_parser(parse_go_duration)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("continue-on-error")
                        .long("continue-on-error")
                        .help(t!("arg.continue_on_error").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("failfast")
                        .long("failfast")
                        .alias("fail-fast")
                        .help(t!("arg.failfast").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(patterns_arg()),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cmd_list.about").to_string())
                .after_help(LIST_EXAMPLES)
                .arg(verbose_arg())
                .arg(run_arg())
                .arg(patterns_arg()),
        )
}

/// Entry point used by `main`: parses `std::env::args()` and runs the command.
pub async fn run() -> Result<Exit> {
    run_from(std::env::args()).await
}

/// Parses `args` (program name first) and runs the selected command.
pub async fn run_from<I>(args: I) -> Result<Exit>
where
    I: IntoIterator<Item = String>,
{
    let args = normalize_go_flags(args);

    // i18n has to be ready before the help texts are built.
    let explicit_language = pre_parse_language(&args);
    match &explicit_language {
        Some(lang) => crate::set_language(lang),
        None => crate::init(),
    }

    let mut cli = build_cli();
    let matches = match cli.try_get_matches_from_mut(&args) {
        Ok(matches) => matches,
        Err(e) => return Ok(report_parse_error(&e)),
    };

    let Some((name, sub)) = matches.subcommand() else {
        console::print_banner();
        cli.print_help()?;
        return Ok(Exit::Help);
    };

    let patterns: Vec<String> = sub
        .get_many::<String>("patterns")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    if patterns.is_empty() {
        if let Some(subcommand) = cli.find_subcommand_mut(name) {
            subcommand.print_help()?;
        }
        return Ok(Exit::Help);
    }

    let file = match sub.get_one::<PathBuf>("config") {
        Some(path) => config::load_config(path)?,
        None => FileConfig::default(),
    };
    if explicit_language.is_none() {
        if let Some(lang) = &file.language {
            crate::set_language(lang);
        }
    }

    let opts = RunOptions::resolve(overrides_from(sub), file)?;
    init_tracing(opts.verbose);

    match name {
        "test" => commands::test::execute(opts, patterns).await,
        "list" => commands::list::execute(opts, patterns).await,
        _ => Ok(Exit::Help),
    }
}

/// Collects the flags of whichever subcommand was chosen. Flags a subcommand
/// does not define read as "not given".
fn overrides_from(sub: &ArgMatches) -> Overrides {
    let flag = |id: &str| {
        sub.try_get_one::<bool>(id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    };
    Overrides {
        go: sub.try_get_one::<PathBuf>("go").ok().flatten().cloned(),
        run: sub.try_get_one::<String>("run").ok().flatten().cloned(),
        retry: sub.try_get_one::<u32>("retry").ok().flatten().copied(),
        timeout: sub.try_get_one::<Duration>("timeout").ok().flatten().copied(),
        continue_on_error: flag("continue-on-error"),
        fail_fast: flag("failfast"),
        verbose: flag("verbose"),
    }
}

fn report_parse_error(e: &clap::Error) -> Exit {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            Exit::Success
        }
        ErrorKind::InvalidSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            console::print_banner();
            let _ = e.print();
            Exit::Help
        }
        _ => {
            let _ = e.print();
            Exit::Help
        }
    }
}

/// Logs go to stderr: debug for testman itself with `-v`, warnings otherwise.
/// `RUST_LOG` takes precedence over both.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "testman=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
