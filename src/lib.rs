//! gguf-warden - provisions a GGUF model from the Hugging Face Hub and keeps
//! the llama.cpp server that serves it running under a process manager.

pub mod config;
pub mod defaults;
pub mod error;

pub mod engine;
pub mod model;
pub mod supervisor;

pub use error::{Error, Result};

pub use config::{ProvisionConfig, ServerConfig, SupervisorConfig};

pub use engine::launcher::{LaunchError, ServerLauncher};
#[cfg(unix)]
pub use engine::relay::forward_signal;
pub use engine::relay::{exit_code, run_foreground};

pub use model::candidates::{base_name, candidate_filenames};
pub use model::hub::{ArtifactSource, HfHubSource, HubError};
pub use model::provision::ensure_artifact;
pub use model::reference::ModelReference;
pub use model::resolver::{ArtifactResolver, ResolvedArtifact};
pub use model::store::LocalStore;

pub use supervisor::{
    default_units, render_config, AuxiliaryError, ServiceDescriptor, Supervisor, SupervisorState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
