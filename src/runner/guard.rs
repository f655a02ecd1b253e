//! Scoped ownership of a child's process group.

use tracing::warn;

/// Kills a child's whole process group when terminated or dropped.
///
/// The child must have been spawned as the leader of a new group
/// (`process_group(0)`), so the group id equals its pid. Killing the group
/// rather than the pid also takes down anything the planner forked.
pub(crate) struct ProcessGroupGuard {
    pgid: Option<i32>,
}

impl ProcessGroupGuard {
    pub(crate) fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.and_then(|p| i32::try_from(p).ok()),
        }
    }

    /// Send SIGKILL to the group. Idempotent.
    pub(crate) fn terminate(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(unix)]
fn kill_group(pgid: i32) {
    if pgid <= 1 {
        return;
    }
    // SAFETY: killpg only sends a signal and touches no memory.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        // ESRCH: the group already exited
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!(pgid, error = %err, "failed to kill planner process group");
        }
    }
}

// Without process groups the child handle's kill_on_drop is the only cleanup.
#[cfg(not(unix))]
fn kill_group(_pgid: i32) {}
