//! Runtime configuration.
//!
//! Each struct is a clap argument group whose options also read from the
//! environment, so the same binary is driven by container env vars.

use std::path::PathBuf;

use clap::Args;

use crate::defaults;

/// Where the model comes from and where it is stored.
#[derive(Args, Debug, Clone)]
pub struct ProvisionConfig {
    /// Model reference, `owner/repo[:variant]`; empty means use the local file only
    #[arg(long, env = "MODEL_NAME", default_value = "")]
    pub model_name: String,

    /// Local filename of the model inside the models directory
    #[arg(long, env = "MODEL_FILENAME", default_value = defaults::MODEL_FILENAME)]
    pub model_filename: String,

    /// Directory holding the model and its companion files
    #[arg(long, env = "MODELS_DIR", default_value = defaults::MODELS_DIR)]
    pub models_dir: PathBuf,

    /// Extension of artifact files in the remote repository
    #[arg(long, env = "ARTIFACT_EXTENSION", default_value = defaults::ARTIFACT_EXTENSION)]
    pub artifact_extension: String,

    /// Hugging Face access token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Alternative hub endpoint
    #[arg(long, env = "HF_ENDPOINT")]
    pub hf_endpoint: Option<String>,

    /// Timeout for repository listing calls, in seconds
    #[arg(long, env = "HUB_REQUEST_TIMEOUT_SECS", default_value_t = defaults::HUB_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Timeout for a single artifact download, in seconds
    #[arg(long, env = "HUB_DOWNLOAD_TIMEOUT_SECS", default_value_t = defaults::HUB_DOWNLOAD_TIMEOUT_SECS)]
    pub download_timeout_secs: u64,
}

impl ProvisionConfig {
    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join(&self.model_filename)
    }

    pub fn hub_cache_dir(&self) -> PathBuf {
        self.models_dir.join(defaults::HUB_CACHE_SUBDIR)
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            model_name: String::new(),
            model_filename: defaults::MODEL_FILENAME.to_string(),
            models_dir: PathBuf::from(defaults::MODELS_DIR),
            artifact_extension: defaults::ARTIFACT_EXTENSION.to_string(),
            hf_token: None,
            hf_endpoint: None,
            request_timeout_secs: defaults::HUB_REQUEST_TIMEOUT_SECS,
            download_timeout_secs: defaults::HUB_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

/// Fixed parameters for the inference server.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Inference server executable
    #[arg(long, env = "LLAMA_SERVER_BIN", default_value = defaults::SERVER_BIN)]
    pub server_bin: PathBuf,

    /// Port the server listens on
    #[arg(long, env = "PORT", default_value_t = defaults::SERVER_PORT)]
    pub port: u16,

    /// API key clients must present
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Companion projector file, expected next to the model
    #[arg(long, env = "MMPROJ_FILENAME", default_value = defaults::MMPROJ_FILENAME)]
    pub mmproj_filename: String,

    /// Context length in tokens
    #[arg(long, env = "CONTEXT_LENGTH", default_value_t = defaults::CONTEXT_LENGTH)]
    pub context_length: u32,

    /// Number of parallel decoding slots
    #[arg(long, env = "PARALLEL", default_value_t = defaults::PARALLEL)]
    pub parallel: u32,
}

/// Settings for the container entry point.
#[derive(Args, Debug, Clone)]
pub struct SupervisorConfig {
    /// SSH public key; when set, the SSH daemon is started
    #[arg(long, env = "PUBLIC_KEY", hide_env_values = true)]
    pub public_key: Option<String>,

    /// SSH daemon executable
    #[arg(long, env = "SSH_DAEMON_BIN", default_value = defaults::SSH_DAEMON_BIN)]
    pub ssh_daemon_bin: PathBuf,

    /// Directory receiving `authorized_keys` (defaults to `$HOME/.ssh`)
    #[arg(long, env = "SSH_DIR")]
    pub ssh_dir: Option<PathBuf>,

    /// Process manager executable
    #[arg(long, env = "PROCESS_MANAGER_BIN", default_value = defaults::PROCESS_MANAGER_BIN)]
    pub process_manager_bin: PathBuf,

    /// Where the process manager config is written
    #[arg(long, env = "PROCESS_MANAGER_CONFIG", default_value = defaults::PROCESS_MANAGER_CONFIG)]
    pub process_manager_config: PathBuf,

    /// Extra application run alongside the model server
    #[arg(long, env = "APP_COMMAND")]
    pub app_command: Option<String>,
}

impl SupervisorConfig {
    pub fn ssh_dir(&self) -> PathBuf {
        self.ssh_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/root"))
                .join(".ssh")
        })
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            ssh_daemon_bin: PathBuf::from(defaults::SSH_DAEMON_BIN),
            ssh_dir: None,
            process_manager_bin: PathBuf::from(defaults::PROCESS_MANAGER_BIN),
            process_manager_config: PathBuf::from(defaults::PROCESS_MANAGER_CONFIG),
            app_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path() {
        let config = ProvisionConfig::default();
        assert_eq!(config.model_path(), PathBuf::from("/models/model.gguf"));
        assert_eq!(
            config.hub_cache_dir(),
            PathBuf::from("/models/.cache/huggingface")
        );
    }

    #[test]
    fn test_ssh_dir_override() {
        let config = SupervisorConfig {
            ssh_dir: Some(PathBuf::from("/tmp/keys")),
            ..SupervisorConfig::default()
        };
        assert_eq!(config.ssh_dir(), PathBuf::from("/tmp/keys"));
    }
}
