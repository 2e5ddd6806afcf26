use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crate::composite::compositor::CompositeImage;
use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{PopError, PopResult};
use crate::target::compiler::{CancelToken, CompiledTarget, TargetCompiler};

/// Runs a [`TargetCompiler`] off the calling thread with a deadline.
#[derive(Clone)]
pub struct TargetCompilerAdapter {
    compiler: Arc<dyn TargetCompiler>,
    timeout: Duration,
}

impl std::fmt::Debug for TargetCompilerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetCompilerAdapter")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TargetCompilerAdapter {
    pub fn new(compiler: Arc<dyn TargetCompiler>, timeout: Duration) -> Self {
        Self { compiler, timeout }
    }

    pub fn from_config(compiler: Arc<dyn TargetCompiler>, config: &PipelineConfig) -> Self {
        Self::new(compiler, config.compile_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start compiling `composite` on a worker thread.
    #[tracing::instrument(skip_all, fields(fingerprint = composite.fingerprint()))]
    pub fn spawn(&self, composite: Arc<CompositeImage>) -> PopResult<CompileJob> {
        let (tx, rx) = mpsc::sync_channel::<anyhow::Result<Vec<u8>>>(1);
        let cancel = CancelToken::new();
        let fingerprint = composite.fingerprint();

        let compiler = Arc::clone(&self.compiler);
        let worker_cancel = cancel.clone();
        std::thread::Builder::new()
            .name("popmark-compile".to_string())
            .spawn(move || {
                let res = compiler
                    .compile_image_targets(std::slice::from_ref(composite.image()), &worker_cancel);
                // The job may have been dropped or timed out; nobody is listening then.
                let _ = tx.send(res);
            })
            .map_err(|e| PopError::target_compile(format!("spawn compile worker: {e}")))?;

        tracing::debug!("compile started");
        Ok(CompileJob {
            rx,
            cancel,
            fingerprint,
            timeout: self.timeout,
            deadline: Instant::now() + self.timeout,
            outcome: None,
        })
    }

    /// Compile and block until the result or the deadline.
    pub fn compile(&self, composite: &Arc<CompositeImage>) -> PopResult<CompiledTarget> {
        self.spawn(Arc::clone(composite))?.wait()
    }
}

/// Handle to one in-flight compile.
///
/// Once finished (success, failure, timeout or cancel) the outcome is fixed and every later
/// `poll`/`wait` reports it again.
#[derive(Debug)]
pub struct CompileJob {
    rx: Receiver<anyhow::Result<Vec<u8>>>,
    cancel: CancelToken,
    fingerprint: u64,
    timeout: Duration,
    deadline: Instant,
    outcome: Option<PopResult<CompiledTarget>>,
}

impl CompileJob {
    /// Fingerprint of the composite being compiled.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Non-blocking check. `None` while the compiler is still running.
    pub fn poll(&mut self) -> Option<PopResult<CompiledTarget>> {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(res) => self.finish(res),
                Err(TryRecvError::Disconnected) => self.fail("compiler worker exited"),
                Err(TryRecvError::Empty) => {
                    if Instant::now() >= self.deadline {
                        self.time_out();
                    }
                }
            }
        }
        self.outcome.as_ref().map(duplicate)
    }

    /// Block until the compile finishes or the deadline passes.
    pub fn wait(&mut self) -> PopResult<CompiledTarget> {
        if self.outcome.is_none() {
            let left = self.deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(res) => self.finish(res),
                Err(RecvTimeoutError::Disconnected) => self.fail("compiler worker exited"),
                Err(RecvTimeoutError::Timeout) => self.time_out(),
            }
        }
        match &self.outcome {
            Some(res) => duplicate(res),
            None => Err(PopError::target_compile("compile produced no outcome")),
        }
    }

    /// Stop waiting and signal the compiler. No-op once finished.
    pub fn cancel(&mut self) {
        if self.outcome.is_none() {
            self.cancel.cancel();
            tracing::debug!(fingerprint = self.fingerprint, "compile cancelled");
            self.outcome = Some(Err(PopError::target_compile("compile cancelled")));
        }
    }

    fn finish(&mut self, res: anyhow::Result<Vec<u8>>) {
        self.outcome = Some(match res {
            Ok(bytes) => {
                tracing::debug!(bytes = bytes.len(), "compile finished");
                Ok(CompiledTarget::new(bytes, self.fingerprint))
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "compile failed");
                Err(PopError::target_compile(format!("{e:#}")))
            }
        });
    }

    fn fail(&mut self, msg: &str) {
        tracing::warn!(msg, "compile failed");
        self.outcome = Some(Err(PopError::target_compile(msg)));
    }

    fn time_out(&mut self) {
        self.cancel.cancel();
        let ms = self.timeout.as_millis();
        tracing::warn!(timeout_ms = ms as u64, "compile timed out");
        self.outcome = Some(Err(PopError::target_compile(format!(
            "compile timed out after {ms} ms"
        ))));
    }
}

impl Drop for CompileJob {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            self.cancel.cancel();
        }
    }
}

fn duplicate(res: &PopResult<CompiledTarget>) -> PopResult<CompiledTarget> {
    match res {
        Ok(t) => Ok(t.clone()),
        Err(e) => Err(e.duplicate()),
    }
}

/// Re-run `op` with identical inputs while it fails with a retriable error, up to `attempts`
/// calls in total. The attempt index is passed to `op` starting at 0.
pub fn retry_idempotent<T>(
    attempts: u32,
    mut op: impl FnMut(u32) -> PopResult<T>,
) -> PopResult<T> {
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Err(e) if e.is_retriable() && attempt + 1 < attempts => {
                tracing::warn!(attempt, error = %e, "retrying");
                attempt += 1;
            }
            res => return res,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/target/job.rs"]
mod tests;
