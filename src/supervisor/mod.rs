//! Container entry point.
//!
//! Runs a small state machine:
//! INIT -> OPTIONAL_SERVICES_STARTING -> SUPERVISED_RUNNING -> TERMINATING
//!
//! Optional services (the SSH daemon) may fail without consequence. The
//! process manager is the primary workload: it stays in the foreground and
//! its exit code becomes ours.

pub mod credentials;
pub mod services;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tokio::process::Command;

use crate::config::SupervisorConfig;
use crate::engine::relay::run_foreground;
use crate::error::Result;

pub use services::{default_units, render_config, ServiceDescriptor};

/// Supervisor lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Init,
    OptionalServicesStarting,
    SupervisedRunning,
    Terminating,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::OptionalServicesStarting => write!(f, "OPTIONAL_SERVICES_STARTING"),
            Self::SupervisedRunning => write!(f, "SUPERVISED_RUNNING"),
            Self::Terminating => write!(f, "TERMINATING"),
        }
    }
}

/// Failures of auxiliary services. Logged, never fatal.
#[derive(Error, Debug)]
pub enum AuxiliaryError {
    #[error("Failed to install SSH key in {}: {source}", .dir.display())]
    Credential {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {}: {source}", .program.display())]
    DaemonSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with code {code}", .program.display())]
    DaemonExit { program: PathBuf, code: i32 },
}

pub struct Supervisor {
    config: SupervisorConfig,
    units: Vec<ServiceDescriptor>,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig, units: Vec<ServiceDescriptor>) -> Self {
        Self {
            config,
            units,
            state: SupervisorState::Init,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Start optional services, then run the process manager until it exits.
    /// Returns the process manager's exit code.
    pub async fn run(&mut self) -> Result<i32> {
        for error in self.start_optional_services().await {
            log::warn!("Continuing without auxiliary service: {}", error);
        }
        self.run_supervised().await
    }

    /// Install the SSH key and start the daemon, if a key was supplied.
    ///
    /// Returns the failures instead of propagating them.
    pub async fn start_optional_services(&mut self) -> Vec<AuxiliaryError> {
        advance(&mut self.state, SupervisorState::OptionalServicesStarting);

        let Some(public_key) = self.config.public_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            log::info!("No public key supplied, SSH daemon not started");
            return Vec::new();
        };

        let ssh_dir = self.config.ssh_dir();
        match credentials::install_authorized_key(&ssh_dir, public_key) {
            Ok(path) => log::info!("Installed SSH key at {:?}", path),
            Err(source) => {
                return vec![AuxiliaryError::Credential {
                    dir: ssh_dir,
                    source,
                }];
            }
        }

        let program = self.config.ssh_daemon_bin.clone();
        match Command::new(&program).status().await {
            Ok(status) if status.success() => {
                log::info!("Started SSH daemon {:?}", program);
                Vec::new()
            }
            Ok(status) => vec![AuxiliaryError::DaemonExit {
                program,
                code: crate::engine::relay::exit_code(status),
            }],
            Err(source) => vec![AuxiliaryError::DaemonSpawn { program, source }],
        }
    }

    /// Write the unit list and keep the process manager in the foreground.
    pub async fn run_supervised(&mut self) -> Result<i32> {
        let config_path = &self.config.process_manager_config;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, render_config(&self.units)?)?;
        log::info!(
            "Wrote {} unit(s) to {:?}",
            self.units.len(),
            config_path
        );

        let mut command = Command::new(&self.config.process_manager_bin);
        command.arg("-n").arg("-c").arg(config_path);

        advance(&mut self.state, SupervisorState::SupervisedRunning);

        let state = &mut self.state;
        let code = run_foreground(&mut command, |signal| {
            log::info!("Received signal {}, stopping services", signal);
            advance(state, SupervisorState::Terminating);
        })
        .await?;

        advance(&mut self.state, SupervisorState::Terminating);
        log::info!("Process manager exited with code {}", code);
        Ok(code)
    }
}

fn advance(state: &mut SupervisorState, next: SupervisorState) {
    if *state != next {
        log::debug!("Supervisor {} -> {}", state, next);
        *state = next;
    }
}
