//! # Toolchain Module Unit Tests / Toolchain 模块单元测试
//!
//! Unit tests for the parts of `core::toolchain` that know the `go` output
//! formats and command lines, plus test binary naming in `infra::fs`.
//!
//! `core::toolchain` 中关于 `go` 输出格式和命令行部分的单元测试，
//! 以及 `infra::fs` 中测试二进制文件的命名。

use std::path::{Path, PathBuf};
use std::time::Duration;
use testman::config::{RunOptions, TestFilter};
use testman::core::toolchain::{
    Toolchain, parse_package_listing, parse_test_listing, test_binary_args,
};
use testman::error::ListError;
use testman::infra::fs::{binary_file_name, binary_path};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod package_listing_tests {
    use super::*;

    #[test]
    fn test_keeps_only_test_mains() {
        let output = "\
example.com/proj/alpha /src/proj/alpha
example.com/proj/alpha [example.com/proj/alpha.test] /src/proj/alpha
example.com/proj/alpha.test /src/proj/alpha
example.com/proj/nodeps /src/proj/nodeps
example.com/proj/beta.test /src/proj/beta
";
        let packages = parse_package_listing(output).unwrap();

        let import_paths: Vec<_> = packages.iter().map(|p| p.import_path.as_str()).collect();
        assert_eq!(import_paths, vec!["example.com/proj/alpha", "example.com/proj/beta"]);
        assert_eq!(packages[0].dir, PathBuf::from("/src/proj/alpha"));
        assert_eq!(packages[1].dir, PathBuf::from("/src/proj/beta"));
    }

    #[test]
    fn test_keeps_spaces_inside_directory() {
        let output = "example.com/proj/alpha.test /home/me/My Projects/alpha\n";
        let packages = parse_package_listing(output).unwrap();
        assert_eq!(packages[0].dir, PathBuf::from("/home/me/My Projects/alpha"));
    }

    #[test]
    fn test_skips_blank_lines_and_crlf() {
        let output = "\r\nexample.com/a.test /src/a\r\n\n";
        let packages = parse_package_listing(output).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].dir, PathBuf::from("/src/a"));
    }

    #[test]
    fn test_empty_output_yields_no_packages() {
        assert!(parse_package_listing("").unwrap().is_empty());
    }

    #[test]
    fn test_test_main_without_directory_is_malformed() {
        let err = parse_package_listing("example.com/a.test\n").unwrap_err();
        assert!(matches!(err, ListError::Malformed(line) if line == "example.com/a.test"));
    }

    #[test]
    fn test_bare_suffix_is_malformed() {
        let err = parse_package_listing(".test /src/a\n").unwrap_err();
        assert!(matches!(err, ListError::Malformed(_)));
    }
}

#[cfg(test)]
mod test_listing_tests {
    use super::*;

    const LISTING: &str = "TestA\nB_skip\nExampleC\nBenchmarkD\nok  \texample.com/proj/alpha\t0.012s\n";

    #[test]
    fn test_default_filter_keeps_tests_and_examples() {
        let opts = RunOptions::default();
        assert_eq!(
            parse_test_listing(LISTING, &opts.filter),
            vec!["TestA", "ExampleC"]
        );
    }

    #[test]
    fn test_anchored_filter_selects_one_name() {
        let output = "A\nB_skip\nok  \tfake\t0.001s\n";
        let filter = TestFilter::new("^A$").unwrap();
        assert_eq!(parse_test_listing(output, &filter), vec!["A"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything_but_summary() {
        let filter = TestFilter::all();
        assert_eq!(
            parse_test_listing(LISTING, &filter),
            vec!["TestA", "B_skip", "ExampleC", "BenchmarkD"]
        );
    }

    #[test]
    fn test_filter_is_unanchored() {
        let filter = TestFilter::new("skip").unwrap();
        assert_eq!(parse_test_listing(LISTING, &filter), vec!["B_skip"]);
    }

    #[test]
    fn test_summary_only_output_yields_nothing() {
        let filter = TestFilter::all();
        assert!(parse_test_listing("ok  \tfake\t0.001s\n", &filter).is_empty());
        assert!(parse_test_listing("\n\n", &filter).is_empty());
    }
}

#[cfg(test)]
mod command_line_tests {
    use super::*;

    fn args_of(cmd: &tokio::process::Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_binary_args() {
        let opts = RunOptions::default();
        assert_eq!(
            test_binary_args("TestA", &opts),
            vec!["-test.count=1", "-test.timeout=300s", "-test.run", "^TestA$"]
        );
    }

    #[test]
    fn test_verbose_binary_args() {
        let opts = RunOptions {
            verbose: true,
            ..RunOptions::default()
        };
        let args = test_binary_args("ExampleB", &opts);
        assert!(args.contains(&"-test.v".to_string()));
        assert_eq!(args.last().unwrap(), "^ExampleB$");
    }

    #[test]
    fn test_global_timeout_is_passed_down() {
        let opts = RunOptions {
            timeout: Some(Duration::from_secs(90)),
            ..RunOptions::default()
        };
        assert!(test_binary_args("TestA", &opts).contains(&"-test.timeout=90s".to_string()));
    }

    #[test]
    fn test_toolchain_command_lines() {
        let toolchain = Toolchain::new("/opt/go/bin/go", CancellationToken::new());
        let dir = Path::new("/src/proj/alpha");

        let list = toolchain.list_packages_command(&["./...".to_string()]);
        assert_eq!(list.as_std().get_program(), "/opt/go/bin/go");
        assert_eq!(
            args_of(&list),
            vec!["list", "-test", "-f", "{{.ImportPath}} {{.Dir}}", "./..."]
        );

        let tests = toolchain.list_tests_command(dir);
        assert_eq!(args_of(&tests), vec!["test", "-list", "."]);
        assert_eq!(tests.as_std().get_current_dir(), Some(dir));

        let compile = toolchain.compile_command(dir, Path::new("/tmp/w/a.test"));
        assert_eq!(args_of(&compile), vec!["test", "-c", "-o", "/tmp/w/a.test"]);
        assert_eq!(compile.as_std().get_current_dir(), Some(dir));

        let run = toolchain.test_binary_command(
            Path::new("/tmp/w/a.test"),
            dir,
            "TestA",
            &RunOptions::default(),
        );
        assert_eq!(run.as_std().get_program(), "/tmp/w/a.test");
        assert_eq!(run.as_std().get_current_dir(), Some(dir));
    }
}

#[cfg(test)]
mod binary_naming_tests {
    use super::*;

    #[test]
    fn test_separators_are_flattened() {
        let suffix = std::env::consts::EXE_SUFFIX;
        assert_eq!(
            binary_file_name("example.com/proj/alpha"),
            format!("example.com~proj~alpha{suffix}")
        );
        assert_eq!(binary_file_name(r"proj\win"), format!("proj~win{suffix}"));
    }

    #[test]
    fn test_distinct_packages_get_distinct_binaries() {
        let work_dir = Path::new("/tmp/testman123");
        let a = binary_path(work_dir, "example.com/a/b");
        let b = binary_path(work_dir, "example.com/a_b");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(work_dir));
    }
}
