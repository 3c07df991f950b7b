//! # Compile Module / 编译模块
//!
//! Builds one test binary per package into the run's work directory.
//!
//! 为每个包构建一个测试二进制文件，放入本次运行的工作目录。

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::models::Package;
use crate::core::toolchain::Toolchain;
use crate::error::{CompileError, Result};
use crate::infra::fs;

/// Compiles the test binary of `package` into `work_dir` and returns its path.
///
/// A failed build writes the compiler's output to stderr and returns a
/// [`CompileError`]; there is no retry.
pub async fn compile_test_binary(
    toolchain: &Toolchain,
    package: &Package,
    work_dir: &Path,
) -> Result<PathBuf> {
    let binary = fs::binary_path(work_dir, &package.import_path);
    let start = Instant::now();

    let captured = toolchain
        .capture(toolchain.compile_command(&package.dir, &binary))
        .await?;

    if !captured.status.success() {
        eprintln!("{}", captured.output.trim_end());
        return Err(CompileError {
            import_path: package.import_path.clone(),
            status: captured.status,
            output: captured.output,
        }
        .into());
    }

    tracing::debug!(
        package = %package.import_path,
        binary = %binary.display(),
        elapsed = ?start.elapsed(),
        "compiled test binary"
    );
    Ok(binary)
}
