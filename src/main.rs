use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lambdakit::config::{DEFAULT_CONFIG_FILE, DeployConfig};
use lambdakit::deploy::{DeployContext, DeployOptions, DeployOutcome};
use lambdakit::package::VersionCheck;
use lambdakit::runtime::{RealRuntime, Runtime};
use log::info;

/// lambdakit-deploy - release a set of dependent packages
///
/// Installs tooling and runs tests for every application in the release,
/// then publishes them at VERSION, dependencies first, and finally bumps the
/// version of the root project.
///
/// Examples:
///   lambdakit-deploy 1.4.0
///   lambdakit-deploy 1.4.0 --skip-publishing
#[derive(Parser, Debug)]
#[command(author, version = env!("LAMBDAKIT_VERSION"), about)]
struct Cli {
    /// Version to release (MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD])
    #[arg(value_name = "VERSION")]
    release_version: String,

    /// Release configuration file
    #[arg(
        long = "config",
        short = 'c',
        env = "LAMBDAKIT_CONFIG",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    /// Install and test everything, but publish nothing
    #[arg(long, env = "LAMBDAKIT_SKIP_PUBLISHING")]
    skip_publishing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(&RealRuntime, cli).await
}

async fn run<R: Runtime>(runtime: &R, cli: Cli) -> Result<()> {
    VersionCheck::parse(&cli.release_version)?;

    let config_path = if cli.config.is_absolute() {
        cli.config.clone()
    } else {
        runtime.current_dir()?.join(&cli.config)
    };
    if !runtime.exists(&config_path) {
        bail!(
            "Configuration file {} not found. Pass --config or set LAMBDAKIT_CONFIG.",
            config_path.display()
        );
    }
    let config = DeployConfig::load(runtime, &config_path)?;
    let root = config_path
        .parent()
        .map(PathBuf::from)
        .context("Configuration file has no parent directory")?;
    let mut deployment = config.to_deployment(&root)?;

    let ctx = DeployContext {
        runtime,
        toolchain: &config.toolchain,
        settle_delay: config.settle_delay(),
    };
    let options = DeployOptions {
        skip_publishing: cli.skip_publishing || config.skip_publishing,
    };

    match deployment.deploy(&ctx, &cli.release_version, &options).await? {
        DeployOutcome::Published => info!("Released version {}.", cli.release_version),
        DeployOutcome::PublishSkipped => info!("Tests passed; nothing was published."),
    }
    Ok(())
}
