//! # Run Control Module / 运行控制模块
//!
//! The cancellation shared by a run, the global-timeout watchdog, and Ctrl-C.
//!
//! Stopping a run cancels one token. Subprocesses started through the
//! toolchain watch that token and are killed when it fires, and the execution
//! loop stops at the next attempt. If the run still has not unwound after
//! [`FORCED_EXIT_GRACE`], the watchdog exits the process.
//!
//! 一次运行共享的取消机制、全局超时看门狗以及 Ctrl-C 处理。

use colored::*;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::infra::t;
use crate::reporting::console;

/// How long a cancelled run may take to unwind before the process is killed.
pub const FORCED_EXIT_GRACE: Duration = Duration::from_secs(10);

/// Why a run was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The global timeout fired after `elapsed`.
    Timeout { elapsed: Duration },
    /// The user pressed Ctrl-C.
    Interrupted,
}

/// Shared cancellation state of one run.
#[derive(Debug, Clone)]
pub struct RunControl {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
    started: Instant,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
            started: Instant::now(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops the run. Only the first reason is kept.
    pub fn stop(&self, reason: StopReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    /// Turns the generic cancellation error into the reason the run was stopped for.
    pub fn resolve(&self, err: Error) -> Error {
        match (err, self.stop_reason()) {
            (Error::Interrupted, Some(StopReason::Timeout { elapsed })) => Error::Timeout { elapsed },
            (err, _) => err,
        }
    }

    /// Starts the global-timeout watchdog.
    ///
    /// After `timeout` it reports the failure, cancels the run, and, should the
    /// run hang on, exits the process with status 1 after [`FORCED_EXIT_GRACE`].
    ///
    /// 启动全局超时看门狗。
    pub fn arm_timeout(&self, timeout: Duration) -> JoinHandle<()> {
        let control = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let elapsed = control.elapsed();
            console::print_timeout(elapsed);
            control.stop(StopReason::Timeout { elapsed });

            tokio::time::sleep(FORCED_EXIT_GRACE).await;
            tracing::error!("run did not stop within {FORCED_EXIT_GRACE:?}, exiting");
            std::process::exit(1);
        })
    }

    /// Cancels the run on Ctrl-C.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        let control = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    println!("\n{}", t!("shutdown_signal").yellow());
                    control.stop(StopReason::Interrupted);
                }
                Err(e) => tracing::warn!("failed to listen for Ctrl-C: {e}"),
            }
        })
    }
}
