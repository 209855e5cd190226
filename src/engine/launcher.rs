//! Inference server launch.
//!
//! The server replaces the current process so signals sent to the managed
//! unit land on the server itself, with no wrapper in between.

use std::convert::Infallible;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::defaults;

/// Errors starting an external program.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to exec {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds and runs the llama.cpp server command line.
#[derive(Debug, Clone)]
pub struct ServerLauncher {
    program: PathBuf,
    model_path: PathBuf,
    mmproj_path: PathBuf,
    context_length: u32,
    parallel: u32,
    port: u16,
    api_key: String,
}

impl ServerLauncher {
    pub fn new(config: &ServerConfig, model_path: PathBuf, models_dir: &Path) -> Self {
        Self {
            program: config.server_bin.clone(),
            model_path,
            mmproj_path: models_dir.join(&config.mmproj_filename),
            context_length: config.context_length,
            parallel: config.parallel,
            port: config.port,
            api_key: config.api_key.clone(),
        }
    }

    /// Server arguments, in the order they are passed.
    pub fn args(&self) -> Vec<OsString> {
        vec![
            "--model".into(),
            self.model_path.clone().into(),
            "--mmproj".into(),
            self.mmproj_path.clone().into(),
            "--n-gpu-layers".into(),
            defaults::GPU_LAYERS_ALL.into(),
            "--flash-attn".into(),
            "on".into(),
            "--ctx-size".into(),
            self.context_length.to_string().into(),
            "--parallel".into(),
            self.parallel.to_string().into(),
            "--jinja".into(),
            "--port".into(),
            self.port.to_string().into(),
            "--host".into(),
            defaults::SERVER_HOST.into(),
            "--api-key".into(),
            self.api_key.clone().into(),
        ]
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.args());
        command
    }

    /// Command line for logs, with the API key masked.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        let mut mask_next = false;
        for arg in self.args() {
            if mask_next {
                parts.push("***".to_string());
                mask_next = false;
                continue;
            }
            let arg = arg.to_string_lossy().into_owned();
            mask_next = arg == "--api-key";
            parts.push(arg);
        }
        parts.join(" ")
    }

    /// Replace the current process with the server.
    ///
    /// Only returns if the server could not be started.
    pub fn exec(&self) -> Result<Infallible, LaunchError> {
        if !self.mmproj_path.is_file() {
            log::warn!("Companion projector not found at {:?}", self.mmproj_path);
        }

        log::info!("Launching {}", self.display_command());
        self.replace_process()
    }

    #[cfg(unix)]
    fn replace_process(&self) -> Result<Infallible, LaunchError> {
        use std::os::unix::process::CommandExt;

        let source = self.command().exec();
        Err(LaunchError::Exec {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })
    }

    #[cfg(not(unix))]
    fn replace_process(&self) -> Result<Infallible, LaunchError> {
        let program = self.program.to_string_lossy().into_owned();
        let status = self
            .command()
            .status()
            .map_err(|source| LaunchError::Spawn { program, source })?;
        std::process::exit(crate::engine::relay::exit_code(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            server_bin: PathBuf::from("llama-server"),
            port: 9000,
            api_key: "secret".into(),
            mmproj_filename: "mmproj.gguf".into(),
            context_length: 8192,
            parallel: 2,
        }
    }

    #[test]
    fn test_fixed_flag_set() {
        let launcher = ServerLauncher::new(
            &config(),
            PathBuf::from("/models/model.gguf"),
            Path::new("/models"),
        );
        let args: Vec<String> = launcher
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--model", "/models/model.gguf",
                "--mmproj", "/models/mmproj.gguf",
                "--n-gpu-layers", "999",
                "--flash-attn", "on",
                "--ctx-size", "8192",
                "--parallel", "2",
                "--jinja",
                "--port", "9000",
                "--host", "0.0.0.0",
                "--api-key", "secret",
            ]
        );
    }

    #[test]
    fn test_display_masks_api_key() {
        let launcher = ServerLauncher::new(
            &config(),
            PathBuf::from("/models/model.gguf"),
            Path::new("/models"),
        );
        let shown = launcher.display_command();
        assert!(shown.starts_with("llama-server --model /models/model.gguf"));
        assert!(shown.ends_with("--api-key ***"));
        assert!(!shown.contains("secret"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_missing_binary_returns_error() {
        let mut config = config();
        config.server_bin = PathBuf::from("/nonexistent/llama-server");
        let launcher = ServerLauncher::new(&config, PathBuf::from("/m/model.gguf"), Path::new("/m"));

        let err = launcher.exec().unwrap_err();
        assert!(matches!(err, LaunchError::Exec { ref program, .. } if program == "/nonexistent/llama-server"));
    }
}
