//! gguf-warden - model provisioning and service supervision for inference containers

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gguf_warden::{
    default_units, ensure_artifact, HfHubSource, LaunchError, LocalStore, ProvisionConfig,
    ServerConfig, ServerLauncher, Supervisor, SupervisorConfig,
};

/// Provision a GGUF model and supervise the server that serves it
#[derive(Parser, Debug)]
#[command(name = "gguf-warden", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Container entry point
    ///
    /// Installs the SSH key and starts the SSH daemon when PUBLIC_KEY is set,
    /// then runs the process manager in the foreground with the model server
    /// as a managed unit.
    Supervise(SupervisorConfig),

    /// Make sure the model is on disk, then replace this process with the server
    Serve(ServeArgs),

    /// Make sure the model is on disk and print its path
    Fetch(ProvisionConfig),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    provision: ProvisionConfig,

    #[command(flatten)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gguf_warden=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            launch_exit_code(&err).unwrap_or(1)
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Supervise(config) => {
            let exe = std::env::current_exe().context("Cannot locate own executable")?;
            let units = default_units(&exe, config.app_command.as_deref());
            let mut supervisor = Supervisor::new(config, units);
            Ok(supervisor.run().await?)
        }
        Commands::Serve(args) => {
            let model_path = provision(&args.provision).await?;
            let launcher = ServerLauncher::new(&args.server, model_path, &args.provision.models_dir);
            match launcher.exec() {
                Ok(never) => match never {},
                Err(e) => Err(e.into()),
            }
        }
        Commands::Fetch(config) => {
            let model_path = provision(&config).await?;
            println!("{}", model_path.display());
            Ok(0)
        }
    }
}

async fn provision(config: &ProvisionConfig) -> anyhow::Result<PathBuf> {
    let store = LocalStore::new(&config.models_dir, &config.model_filename);
    let source = HfHubSource::new(config)?;
    let path = ensure_artifact(
        &store,
        &config.model_name,
        &config.artifact_extension,
        &source,
    )
    .await?;
    Ok(path)
}

/// Shell-style status for a server that could not be exec'd.
fn launch_exit_code(err: &anyhow::Error) -> Option<i32> {
    match err.downcast_ref::<LaunchError>()? {
        LaunchError::Exec { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            Some(127)
        }
        LaunchError::Exec { .. } => Some(126),
        _ => None,
    }
}
