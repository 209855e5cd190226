//! Default values for provisioning, serving and supervision.

pub const MODEL_FILENAME: &str = "model.gguf";
pub const MODELS_DIR: &str = "/models";
pub const ARTIFACT_EXTENSION: &str = ".gguf";
pub const HUB_CACHE_SUBDIR: &str = ".cache/huggingface";
pub const HUB_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const HUB_DOWNLOAD_TIMEOUT_SECS: u64 = 4 * 60 * 60;

/// Cap on the repository files reported when every candidate misses.
pub const MAX_LISTED_ARTIFACTS: usize = 10;

pub const SERVER_BIN: &str = "llama-server";
pub const SERVER_PORT: u16 = 8000;
pub const SERVER_HOST: &str = "0.0.0.0";
pub const MMPROJ_FILENAME: &str = "mmproj.gguf";
pub const CONTEXT_LENGTH: u32 = 32768;
pub const PARALLEL: u32 = 1;
pub const GPU_LAYERS_ALL: &str = "999";

pub const SSH_DAEMON_BIN: &str = "/usr/sbin/sshd";
pub const PROCESS_MANAGER_BIN: &str = "supervisord";
pub const PROCESS_MANAGER_CONFIG: &str = "/tmp/gguf-warden-supervisord.conf";

pub const MODEL_SERVER_UNIT: &str = "model-server";
pub const MODEL_SERVER_ORDER: i32 = 100;
pub const APP_UNIT: &str = "app";
pub const APP_ORDER: i32 = 200;
