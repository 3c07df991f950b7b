//! # File System Operations Module / 文件系统操作模块
//!
//! The per-run work directory and the naming of compiled test binaries in it.
//!
//! 每次运行的工作目录，以及其中已编译测试二进制文件的命名。

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::Result;

/// Prefix of every work directory, to make leftovers easy to spot.
pub const WORK_DIR_PREFIX: &str = "testman";

/// Creates the temporary directory that holds the test binaries of one run.
/// The directory and everything in it is deleted when the returned guard is dropped.
///
/// 创建保存一次运行中测试二进制文件的临时目录。
/// 返回的 guard 被丢弃时，目录及其内容会被删除。
pub fn create_work_dir() -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix(WORK_DIR_PREFIX)
        .tempdir()?;
    tracing::debug!(path = %dir.path().display(), "created work directory");
    Ok(dir)
}

/// File name of the test binary for `import_path`: path separators become `~`
/// so every package gets a distinct, flat name.
///
/// # Examples
/// ```
/// assert_eq!(testman::infra::fs::binary_file_name("example.com/a/b"),
///            format!("example.com~a~b{}", std::env::consts::EXE_SUFFIX));
/// ```
pub fn binary_file_name(import_path: &str) -> String {
    let flat: String = import_path
        .chars()
        .map(|c| if c == '/' || c == '\\' { '~' } else { c })
        .collect();
    format!("{flat}{}", std::env::consts::EXE_SUFFIX)
}

/// Full path of the test binary for `import_path` inside `work_dir`.
pub fn binary_path(work_dir: &Path, import_path: &str) -> PathBuf {
    work_dir.join(binary_file_name(import_path))
}
