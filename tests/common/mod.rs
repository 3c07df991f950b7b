// Shared test helpers for integration tests: a fake `go` toolchain.
//
// The fake `go` answers the three commands testman issues (`list -test -f`,
// `test -list .`, `test -c -o`) from files under a temporary root, and
// "compiles" every package into a copy of one shell script that plays the
// test binary. Marker files in a package directory decide how each test
// behaves:
//
//   fail/<Test>    always fails
//   flaky/<Test>   contains N; fails until the N-th attempt
//   hang/<Test>    sleeps for 30s
//   compile_fail   `go test -c` fails for the package
//
// The binary records its arguments in `args.log` and counts attempts in
// `attempts/<Test>`.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const FAKE_GO: &str = r#"#!/bin/sh
ROOT='@ROOT@'
case "$1" in
  list)
    if [ -f "$ROOT/list_fail" ]; then
      echo "go: pattern does not match any packages" >&2
      exit 1
    fi
    cat "$ROOT/packages.txt"
    ;;
  test)
    case "$2" in
      -list)
        if [ -f list_fail ]; then
          echo "setup failed" >&2
          exit 1
        fi
        if [ -f tests.txt ]; then
          cat tests.txt
        fi
        printf 'ok  \tfake\t0.001s\n'
        ;;
      -c)
        if [ -f compile_fail ]; then
          echo "./broken_test.go:3:1: syntax error: non-declaration statement outside function body" >&2
          exit 2
        fi
        cp "$ROOT/testbin.sh" "$4"
        chmod +x "$4"
        ;;
      *)
        echo "unsupported: $*" >&2
        exit 2
        ;;
    esac
    ;;
  *)
    echo "unsupported: $*" >&2
    exit 2
    ;;
esac
"#;

const FAKE_TEST_BINARY: &str = r#"#!/bin/sh
echo "$*" >> args.log
name=""
while [ $# -gt 0 ]; do
  case "$1" in
    -test.run)
      name="$2"
      shift 2
      ;;
    *)
      shift
      ;;
  esac
done
name="${name#^}"
name="${name%\$}"
mkdir -p attempts
count=0
if [ -f "attempts/$name" ]; then
  count=$(cat "attempts/$name")
fi
count=$((count + 1))
echo "$count" > "attempts/$name"
echo "=== RUN   $name"
if [ -f "hang/$name" ]; then
  exec sleep 30
fi
if [ -f "fail/$name" ]; then
  echo "--- FAIL: $name"
  exit 1
fi
if [ -f "flaky/$name" ]; then
  need=$(cat "flaky/$name")
  if [ "$count" -lt "$need" ]; then
    echo "--- FAIL: $name (attempt $count)"
    exit 1
  fi
fi
echo "--- PASS: $name"
exit 0
"#;

pub struct FakeGo {
    pub root: TempDir,
}

impl FakeGo {
    pub fn new() -> Self {
        let root = tempdir().expect("Failed to create temporary directory");
        let root_path = root.path().to_str().expect("temp path is not UTF-8");

        write_executable(&root.path().join("go"), &FAKE_GO.replace("@ROOT@", root_path));
        write_executable(&root.path().join("testbin.sh"), FAKE_TEST_BINARY);
        fs::write(root.path().join("packages.txt"), "").unwrap();

        FakeGo { root }
    }

    pub fn go_path(&self) -> PathBuf {
        self.root.path().join("go")
    }

    /// The script every package "compiles" into.
    pub fn test_binary(&self) -> PathBuf {
        self.root.path().join("testbin.sh")
    }

    /// Adds a package with the given test names, listed the way `go list -test`
    /// does: the package, its test main, and the recompiled package variant.
    pub fn add_package(&self, import_path: &str, tests: &[&str]) -> PathBuf {
        let dir = self
            .root
            .path()
            .join("pkgs")
            .join(import_path.replace('/', "_"));
        fs::create_dir_all(&dir).unwrap();

        let mut listing = String::new();
        for test in tests {
            listing.push_str(test);
            listing.push('\n');
        }
        fs::write(dir.join("tests.txt"), listing).unwrap();

        let mut packages = fs::read_to_string(self.root.path().join("packages.txt")).unwrap();
        let dir_str = dir.display();
        packages.push_str(&format!("{import_path} {dir_str}\n"));
        packages.push_str(&format!("{import_path} [{import_path}.test] {dir_str}\n"));
        packages.push_str(&format!("{import_path}.test {dir_str}\n"));
        fs::write(self.root.path().join("packages.txt"), packages).unwrap();

        dir
    }

    pub fn set_failing(&self, dir: &Path, test: &str) {
        mark(dir, "fail", test, "");
    }

    /// The test fails until its `passes_on`-th attempt.
    pub fn set_flaky(&self, dir: &Path, test: &str, passes_on: u32) {
        mark(dir, "flaky", test, &passes_on.to_string());
    }

    pub fn set_hanging(&self, dir: &Path, test: &str) {
        mark(dir, "hang", test, "");
    }

    pub fn break_compile(&self, dir: &Path) {
        fs::write(dir.join("compile_fail"), "").unwrap();
    }

    pub fn break_package_listing(&self) {
        fs::write(self.root.path().join("list_fail"), "").unwrap();
    }

    pub fn break_test_listing(&self, dir: &Path) {
        fs::write(dir.join("list_fail"), "").unwrap();
    }

    /// How many times the test binary was started for `test`.
    pub fn attempts(&self, dir: &Path, test: &str) -> u32 {
        fs::read_to_string(dir.join("attempts").join(test))
            .map(|s| s.trim().parse().unwrap())
            .unwrap_or(0)
    }

    /// Every argument line the test binary was started with in `dir`.
    pub fn args_log(&self, dir: &Path) -> String {
        fs::read_to_string(dir.join("args.log")).unwrap_or_default()
    }
}

fn mark(dir: &Path, kind: &str, test: &str, content: &str) {
    let marker_dir = dir.join(kind);
    fs::create_dir_all(&marker_dir).unwrap();
    fs::write(marker_dir.join(test), content).unwrap();
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
