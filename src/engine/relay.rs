//! Foreground child processes with signal forwarding.
//!
//! Used where the current process has to stay alive as the parent, e.g. the
//! supervisor keeping the process manager in the foreground. Termination
//! signals received by this process are passed on to the child and the
//! child's exit code is handed back so the caller can mirror it.

use std::process::ExitStatus;

use tokio::process::Command;

use crate::engine::launcher::LaunchError;

/// Send `signal` to `pid`. Returns false if the process is gone.
#[cfg(unix)]
pub fn forward_signal(pid: u32, signal: i32) -> bool {
    if pid == 0 {
        return false;
    }
    unsafe { libc::kill(pid as libc::pid_t, signal) == 0 }
}

/// Exit code to mirror for a finished child; `128 + n` if killed by signal `n`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Spawn `command`, forward termination signals to it until it exits, and
/// return its exit code. `on_signal` sees each relayed signal number.
#[cfg(unix)]
pub async fn run_foreground<F>(command: &mut Command, mut on_signal: F) -> Result<i32, LaunchError>
where
    F: FnMut(i32),
{
    use tokio::signal::unix::{signal, SignalKind};

    let program = format!("{:?}", command.as_std().get_program());

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut quit = signal(SignalKind::quit())?;

    let mut child = command.spawn().map_err(|e| LaunchError::Spawn {
        program: program.clone(),
        source: e,
    })?;
    let pid = child.id().unwrap_or(0);
    log::debug!("Started {} as PID {}", program, pid);

    loop {
        let signo = tokio::select! {
            status = child.wait() => return Ok(exit_code(status?)),
            _ = terminate.recv() => libc::SIGTERM,
            _ = interrupt.recv() => libc::SIGINT,
            _ = hangup.recv() => libc::SIGHUP,
            _ = quit.recv() => libc::SIGQUIT,
        };

        on_signal(signo);
        if forward_signal(pid, signo) {
            log::info!("Forwarded signal {} to PID {}", signo, pid);
        } else {
            log::warn!("Could not forward signal {} to PID {}", signo, pid);
        }
    }
}

#[cfg(not(unix))]
pub async fn run_foreground<F>(command: &mut Command, mut on_signal: F) -> Result<i32, LaunchError>
where
    F: FnMut(i32),
{
    let program = format!("{:?}", command.as_std().get_program());
    let mut child = command.spawn().map_err(|e| LaunchError::Spawn {
        program: program.clone(),
        source: e,
    })?;

    tokio::select! {
        status = child.wait() => return Ok(exit_code(status?)),
        _ = tokio::signal::ctrl_c() => {
            on_signal(2);
            child.start_kill()?;
        }
    }

    Ok(exit_code(child.wait().await?))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mirrors_exit_code() {
        let mut command = Command::new("/bin/sh");
        command.args(["-c", "exit 3"]);
        let code = run_foreground(&mut command, |_| {}).await.unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let mut command = Command::new("/nonexistent/process-manager");
        let err = run_foreground(&mut command, |_| {}).await.unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[test]
    fn test_forwarded_signal_becomes_exit_code() {
        let mut child = std::process::Command::new("/bin/sh")
            .args(["-c", "sleep 30"])
            .spawn()
            .unwrap();

        assert!(forward_signal(child.id(), libc::SIGTERM));
        let status = child.wait().unwrap();
        assert_eq!(exit_code(status), 128 + libc::SIGTERM);
    }

    #[test]
    fn test_forward_to_pid_zero_refused() {
        assert!(!forward_signal(0, libc::SIGTERM));
    }
}
