//! `scriptexec` - deployment tool for the scriptexec engine

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scriptexec_config::{EngineSettings, LogFormat, LoggingSettings};
use scriptexec_primitives::Address;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "scriptexec", version, about = "Deploy and inspect scriptexec applications")]
struct Cli {
    /// Settings file (TOML); defaults apply when omitted
    #[arg(long, short, global = true, env = "SCRIPTEXEC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy the registry and the DutchCrowdsale application
    Deploy {
        /// Seed of the provider address registering the application
        #[arg(long, default_value = "provider")]
        provider: String,

        /// Seed of the exec admin address of the script exec front end
        #[arg(long, default_value = "exec-admin")]
        exec_admin: String,

        /// Also write the env manifest to this file
        #[arg(long)]
        env_out: Option<PathBuf>,
    },
    /// Write a settings file containing every default
    InitConfig {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;
    let installed = match logging.format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(false).try_init(),
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => EngineSettings::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineSettings::default(),
    };
    settings.validate()?;
    init_tracing(&settings.logging)?;

    let output = match cli.command {
        Command::Deploy {
            provider,
            exec_admin,
            env_out,
        } => commands::deploy::execute(
            &settings,
            Address::derive(exec_admin.as_bytes()),
            Address::derive(provider.as_bytes()),
            env_out.as_deref(),
        )?,
        Command::InitConfig { path, force } => commands::init_config::execute(&path, force)?,
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
