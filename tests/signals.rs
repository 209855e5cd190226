//! Termination signals delivered to this process while a child runs in the
//! foreground. Kept in its own test binary so the signals never reach
//! unrelated tests.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::sync::Mutex;
use std::time::Duration;

use tokio::process::Command;
use tokio::signal::unix::{signal, SignalKind};

use gguf_warden::{run_foreground, Supervisor, SupervisorConfig, SupervisorState};

/// Both tests signal the whole process, so they must not overlap.
static SIGNAL_LOCK: Mutex<()> = Mutex::new(());

/// Send SIGTERM to this process after `delay`, from a plain thread.
fn terminate_self_after(delay: Duration) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        unsafe {
            libc::kill(libc::getpid(), libc::SIGTERM);
        }
    })
}

#[tokio::test]
async fn test_sigterm_is_relayed_to_child() {
    let _guard = SIGNAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // Replace the default action before anything can deliver SIGTERM.
    let _installed = signal(SignalKind::terminate()).unwrap();

    let mut command = Command::new("/bin/sh");
    command.args(["-c", "exec sleep 30"]);

    let sender = terminate_self_after(Duration::from_millis(500));
    let mut seen = Vec::new();
    let code = run_foreground(&mut command, |signo| seen.push(signo))
        .await
        .unwrap();
    sender.join().unwrap();

    assert_eq!(code, 128 + libc::SIGTERM);
    assert_eq!(seen, vec![libc::SIGTERM]);
}

#[tokio::test]
async fn test_supervisor_terminates_on_sigterm() {
    let _guard = SIGNAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _installed = signal(SignalKind::terminate()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let manager = dir.path().join("process-manager");
    std::fs::write(&manager, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&manager, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = SupervisorConfig {
        ssh_dir: Some(dir.path().join(".ssh")),
        process_manager_bin: manager,
        process_manager_config: dir.path().join("supervisord.conf"),
        ..SupervisorConfig::default()
    };
    let mut supervisor = Supervisor::new(config, Vec::new());

    let sender = terminate_self_after(Duration::from_millis(500));
    let code = supervisor.run_supervised().await.unwrap();
    sender.join().unwrap();

    assert_eq!(code, 128 + libc::SIGTERM);
    assert_eq!(supervisor.state(), SupervisorState::Terminating);
    assert!(dir.path().join("supervisord.conf").is_file());
}
