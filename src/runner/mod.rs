//! Planner process execution.
//!
//! [`ProcessRunner`] launches one planner invocation and always hands back an
//! [`Invocation`]; it never returns an error. A missing executable, a timeout
//! or a Ctrl-C all become a [`Termination`] variant with whatever output was
//! captured, so one bad cell can't stop a sweep.
//!
//! The child is started in its own process group. A guard kills the group on
//! every exit path, so a timed-out planner can't leave JVM workers or shell
//! descendants running into the next cell.

mod guard;

use crate::planner::{PlannerSpec, display_command};
use guard::ProcessGroupGuard;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How long pipe readers may keep draining after the child is gone.
const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Process exited on its own. `code` is `None` if it died from a signal.
    Exited { code: Option<i32> },
    /// Killed by the harness after the wall-clock timeout.
    TimedOut,
    /// The executable could not be started.
    LaunchFailed,
    /// The sweep was cancelled while this invocation was running.
    Cancelled,
}

impl Termination {
    /// True for every ending that rules out a usable result.
    pub fn is_aborted(&self) -> bool {
        !matches!(self, Termination::Exited { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Termination::Exited { code } => *code,
            _ => None,
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Exited { code: Some(code) } => write!(f, "exited with code {}", code),
            Termination::Exited { code: None } => write!(f, "terminated by signal"),
            Termination::TimedOut => write!(f, "timed out"),
            Termination::LaunchFailed => write!(f, "failed to launch"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Everything observed about one planner run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Exact argv that was launched (program first)
    pub argv: Vec<String>,
    pub termination: Termination,
    /// stdout and stderr merged in arrival order
    pub output: String,
    /// Wall-clock time around the whole invocation
    pub elapsed: Duration,
}

impl Invocation {
    pub fn timed_out(&self) -> bool {
        self.termination == Termination::TimedOut
    }

    pub fn command_display(&self) -> String {
        display_command(&self.argv)
    }
}

/// Runs planner processes under a hard timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    drain_grace: Duration,
    working_dir: Option<PathBuf>,
    cancel: Option<CancellationToken>,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            drain_grace: DEFAULT_DRAIN_GRACE,
            working_dir: None,
            cancel: None,
        }
    }

    /// Run children from this directory instead of the current one.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Abort the in-flight invocation when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `spec` on one domain/problem pair.
    pub async fn run(&self, spec: &PlannerSpec, domain_file: &Path, problem_file: &Path) -> Invocation {
        let argv = spec.command_line(domain_file, problem_file, self.timeout);
        self.run_argv(argv).await
    }

    /// Run an arbitrary argv (program first).
    pub async fn run_argv(&self, argv: Vec<String>) -> Invocation {
        let start = Instant::now();

        let Some((program, args)) = argv.split_first() else {
            return Invocation {
                argv,
                termination: Termination::LaunchFailed,
                output: "[LAUNCH ERROR] empty command line\n".to_string(),
                elapsed: start.elapsed(),
            };
        };

        debug!(command = %display_command(&argv), timeout_s = self.timeout.as_secs_f64(), "launching planner");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program, error = %e, "failed to launch planner");
                let output = format!("[LAUNCH ERROR] failed to start `{}`: {}\n", program, e);
                return Invocation {
                    argv,
                    termination: Termination::LaunchFailed,
                    output,
                    elapsed: start.elapsed(),
                };
            }
        };

        let mut group = ProcessGroupGuard::new(child.id());

        let buffer = Arc::new(Mutex::new(String::new()));
        let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump_lines(stdout, Arc::clone(&buffer))));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump_lines(stderr, Arc::clone(&buffer))));
        }

        let mut wait_error = None;
        let termination = tokio::select! {
            waited = tokio::time::timeout(self.timeout, child.wait()) => match waited {
                Ok(Ok(status)) => Termination::Exited { code: status.code() },
                Ok(Err(e)) => {
                    wait_error = Some(e);
                    Termination::Exited { code: None }
                }
                Err(_) => Termination::TimedOut,
            },
            _ = cancelled(self.cancel.as_ref()) => Termination::Cancelled,
        };

        // Normal exit included: stray descendants would otherwise hold the pipes open.
        group.terminate();
        if termination.is_aborted() {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "start_kill after group kill");
            }
            if tokio::time::timeout(self.drain_grace, child.wait()).await.is_err() {
                warn!("planner did not exit after SIGKILL within grace period");
            }
        }

        for mut reader in readers {
            if tokio::time::timeout(self.drain_grace, &mut reader).await.is_err() {
                reader.abort();
            }
        }

        let mut output = std::mem::take(&mut *buffer.lock().unwrap_or_else(|e| e.into_inner()));
        if let Some(e) = wait_error {
            output.push_str(&format!("\n[HARNESS] failed to wait for planner: {}\n", e));
        }
        if termination == Termination::TimedOut {
            output.push_str(&format!(
                "\n\n[TIMEOUT] Killed after {}s (harness-level timeout).\n",
                self.timeout.as_secs_f64()
            ));
        }

        let elapsed = start.elapsed();
        debug!(%termination, elapsed_s = elapsed.as_secs_f64(), output_chars = output.len(), "planner finished");

        Invocation {
            argv,
            termination,
            output,
            elapsed,
        }
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

/// Copy a child stream into the shared buffer line by line.
async fn pump_lines<R>(stream: R, sink: Arc<Mutex<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let mut buf = sink.lock().unwrap_or_else(|e| e.into_inner());
                buf.push_str(&text);
                if !text.ends_with('\n') {
                    buf.push('\n');
                }
            }
        }
    }
}
