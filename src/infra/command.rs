//! # Command Execution Module / 命令执行模块
//!
//! Spawning toolchain subprocesses and capturing their combined output.
//!
//! 派生工具链子进程并捕获其合并输出。

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(mut cmd: Command) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other("failed to capture child output")),
            String::new(),
        );
    };

    // Both readers append whole lines so stdout and stderr interleave line by line.
    // 两个读取任务都按整行追加，因此 stdout 和 stderr 按行交错。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let status = child.wait().await;

    if let Err(e) = stdout_handle.await {
        tracing::warn!("failed to join stdout reader: {e}");
    }
    if let Err(e) = stderr_handle.await {
        tracing::warn!("failed to join stderr reader: {e}");
    }

    let output = output.lock().await.clone();
    (status, output)
}

/// Like [`spawn_and_capture`], but gives up as soon as `token` is cancelled.
///
/// Returns `None` when cancelled. The child is killed on the way out, so the
/// command must not have opted out of `kill_on_drop`.
///
/// 与 [`spawn_and_capture`] 相同，但在 `token` 被取消时立即放弃并杀死子进程。
pub async fn spawn_and_capture_until(
    mut cmd: Command,
    token: &CancellationToken,
) -> Option<(std::io::Result<ExitStatus>, String)> {
    if token.is_cancelled() {
        return None;
    }
    cmd.kill_on_drop(true);
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        res = spawn_and_capture(cmd) => Some(res),
    }
}

/// Renders a command line for logs, shell-quoted where needed.
pub fn describe(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    let parts: Vec<String> = std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect();
    shlex::try_join(parts.iter().map(String::as_str)).unwrap_or_else(|_| parts.join(" "))
}
